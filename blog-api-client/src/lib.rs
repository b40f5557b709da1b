//! Клиентская библиотека для REST API блога.
//!
//! Единая точка исходящих HTTP-вызовов: базовый URL из конфигурации, токен
//! сессии в заголовке `Authorization: Token <...>` на каждом запросе,
//! нормализация транспортных и HTTP-ошибок в единую классификацию с готовым
//! сообщением для пользователя.
//!
//! Сессия хранится в явном [`SessionStore`], внедряемом при создании клиента:
//! она создаётся входом, сбрасывается выходом и любым ответом 401.
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod models;
mod session;

pub use config::{BASE_URL_ENV, Config, DEFAULT_BASE_URL};
pub use error::{
    ApiError, ApiResult, BAD_REQUEST_MESSAGE, FORBIDDEN_MESSAGE, NETWORK_ERROR_MESSAGE,
    NOT_FOUND_MESSAGE, SERVER_ERROR_MESSAGE, UNAUTHORIZED_MESSAGE, UNEXPECTED_ERROR_MESSAGE,
};
pub use models::{
    Credentials, LoginResponse, NewUser, PAGE_SIZE, Post, PostDraft, PostPage, RegisterResponse,
    User, clamp_page, total_pages,
};
pub use session::{Session, SessionStore};

use reqwest::Method;
use tracing::warn;
use validator::Validate;

use http::HttpTransport;

#[derive(Debug, Clone)]
/// Клиент REST API блога.
pub struct ApiClient {
    http: HttpTransport,
    session: SessionStore,
}

impl ApiClient {
    /// Клиент с пустой сессией.
    pub fn new(config: Config) -> Self {
        Self::with_session(config, SessionStore::new())
    }

    /// Клиент с внедрённым хранилищем сессии.
    ///
    /// Хранилище разделяется с вызывающим кодом: вход и 401 меняют его
    /// состояние, и вызывающий видит изменения через свой клон.
    pub fn with_session(config: Config, session: SessionStore) -> Self {
        Self {
            http: HttpTransport::new(&config),
            session,
        }
    }

    /// Хранилище сессии клиента.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Регистрирует пользователя.
    ///
    /// Сессию не создаёт: токен из ответа игнорируется, вход выполняется
    /// отдельным вызовом [`ApiClient::login`].
    pub async fn register(&self, new_user: &NewUser) -> ApiResult<RegisterResponse> {
        new_user
            .validate()
            .map_err(|errors| ApiError::from_validation(&errors))?;

        let token = self.session.token();
        let request = self
            .http
            .request(Method::POST, "/auth/register/", token.as_deref())
            .json(new_user);
        self.http
            .send(request)
            .await
            .map_err(|err| self.drop_session_on_unauthorized(err))
    }

    /// Выполняет вход и сохраняет сессию `{token, user}` в хранилище.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        credentials
            .validate()
            .map_err(|errors| ApiError::from_validation(&errors))?;

        let token = self.session.token();
        let request = self
            .http
            .request(Method::POST, "/auth/login/", token.as_deref())
            .json(credentials);
        let response: LoginResponse = self
            .http
            .send(request)
            .await
            .map_err(|err| self.drop_session_on_unauthorized(err))?;

        self.session.set(response.token.clone(), response.user.clone());
        Ok(response)
    }

    /// Выполняет выход.
    ///
    /// Локальная сессия сбрасывается независимо от ответа сервера; результат
    /// серверного вызова возвращается вызывающему.
    pub async fn logout(&self) -> ApiResult<()> {
        let token = self.session.token();
        let request = self
            .http
            .request(Method::POST, "/auth/logout/", token.as_deref());
        let result = self.http.send_unit(request).await;

        self.session.clear();
        result
    }

    /// Возвращает пользователя текущей сессии.
    pub async fn current_user(&self) -> ApiResult<User> {
        let token = self.session.token();
        let request = self.http.request(Method::GET, "/auth/user/", token.as_deref());
        self.http
            .send(request)
            .await
            .map_err(|err| self.drop_session_on_unauthorized(err))
    }

    /// Возвращает страницу листинга постов; `page` начинается с 1.
    ///
    /// Размер страницы фиксирован на стороне сервера ([`PAGE_SIZE`]); страница
    /// вне диапазона приходит как 404 и классифицируется в
    /// [`ApiError::NotFound`].
    pub async fn list_posts(&self, page: u32) -> ApiResult<PostPage> {
        let token = self.session.token();
        let request = self
            .http
            .request(Method::GET, "/blogs/", token.as_deref())
            .query(&[("page", page)]);
        self.http
            .send(request)
            .await
            .map_err(|err| self.drop_session_on_unauthorized(err))
    }

    /// Возвращает пост по идентификатору.
    pub async fn get_post(&self, id: i64) -> ApiResult<Post> {
        let token = self.session.token();
        let request = self
            .http
            .request(Method::GET, &format!("/blogs/{id}/"), token.as_deref());
        self.http
            .send(request)
            .await
            .map_err(|err| self.drop_session_on_unauthorized(err))
    }

    /// Создаёт пост от имени пользователя текущей сессии.
    ///
    /// Пустой заголовок или содержимое отклоняются локально, без обращения
    /// к серверу.
    pub async fn create_post(&self, draft: &PostDraft) -> ApiResult<Post> {
        draft
            .validate()
            .map_err(|errors| ApiError::from_validation(&errors))?;

        let token = self.session.token();
        let request = self
            .http
            .request(Method::POST, "/blogs/", token.as_deref())
            .json(draft);
        self.http
            .send(request)
            .await
            .map_err(|err| self.drop_session_on_unauthorized(err))
    }

    /// Полностью заменяет пост по идентификатору.
    ///
    /// Чужой пост приходит как 403, отсутствующий — как 404; обе проверки
    /// выполняет сервер.
    pub async fn update_post(&self, id: i64, draft: &PostDraft) -> ApiResult<Post> {
        draft
            .validate()
            .map_err(|errors| ApiError::from_validation(&errors))?;

        let token = self.session.token();
        let request = self
            .http
            .request(Method::PUT, &format!("/blogs/{id}/"), token.as_deref())
            .json(draft);
        self.http
            .send(request)
            .await
            .map_err(|err| self.drop_session_on_unauthorized(err))
    }

    /// Удаляет пост по идентификатору.
    ///
    /// Повторное удаление того же идентификатора приходит как 404 и
    /// классифицируется в [`ApiError::NotFound`].
    pub async fn delete_post(&self, id: i64) -> ApiResult<()> {
        let token = self.session.token();
        let request = self
            .http
            .request(Method::DELETE, &format!("/blogs/{id}/"), token.as_deref());
        self.http
            .send_unit(request)
            .await
            .map_err(|err| self.drop_session_on_unauthorized(err))
    }

    // Единая политика 401: токен мёртв, держать его дальше бессмысленно.
    fn drop_session_on_unauthorized(&self, err: ApiError) -> ApiError {
        if matches!(err, ApiError::Unauthorized(_)) && self.session.is_authenticated() {
            warn!("session token rejected with 401, clearing session");
            self.session.clear();
        }
        err
    }
}
