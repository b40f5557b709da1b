use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Размер страницы листинга; задаётся бэкендом и не передаётся в запросе.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Имя; бэкенд допускает пустое значение.
    #[serde(default)]
    pub first_name: String,
    /// Фамилия; бэкенд допускает пустое значение.
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ успешного входа: токен и личность пользователя.
pub struct LoginResponse {
    /// Токен сессии.
    pub token: String,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ успешной регистрации.
pub struct RegisterResponse {
    /// Созданный пользователь.
    pub user: User,
    /// Токен, выписанный при регистрации. Клиент его не сохраняет:
    /// сессия создаётся отдельным входом.
    pub token: String,
    /// Служебное сообщение сервера.
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Идентификатор автора.
    pub author: i64,
    /// Отображаемое имя автора.
    pub author_username: String,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Подсказка для отображения «это мой пост».
    ///
    /// Не является проверкой прав: авторство на изменение и удаление
    /// проверяет сервер.
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author == user.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Страница листинга постов.
pub struct PostPage {
    /// Общее количество постов во всех страницах.
    pub count: u64,
    /// Ссылка пагинатора на следующую страницу, если она есть.
    #[serde(default)]
    pub next: Option<String>,
    /// Ссылка пагинатора на предыдущую страницу, если она есть.
    #[serde(default)]
    pub previous: Option<String>,
    /// Посты текущей страницы, от новых к старым.
    pub results: Vec<Post>,
}

impl PostPage {
    /// Общее количество страниц при фиксированном [`PAGE_SIZE`].
    pub fn total_pages(&self) -> u32 {
        total_pages(self.count)
    }
}

/// Количество страниц для `count` постов (деление с округлением вверх).
pub fn total_pages(count: u64) -> u32 {
    count.div_ceil(u64::from(PAGE_SIZE)) as u32
}

/// Приводит запрошенную страницу в диапазон `1..=total_pages`.
///
/// Для пустого листинга возвращает 1.
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}

#[derive(Debug, Clone, Serialize, Validate)]
/// Данные регистрации нового пользователя.
pub struct NewUser {
    /// Логин.
    #[validate(length(min = 1, max = 150, message = "This field may not be blank."))]
    pub username: String,
    /// Email.
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    /// Пароль.
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
    /// Имя (опционально).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Фамилия (опционально).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
/// Учётные данные для входа.
pub struct Credentials {
    /// Логин.
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub username: String,
    /// Пароль.
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
/// Черновик поста: тело `POST /blogs/` и `PUT /blogs/{id}/` (полная замена).
pub struct PostDraft {
    /// Заголовок.
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: String,
    /// Содержимое.
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub content: String,
}
