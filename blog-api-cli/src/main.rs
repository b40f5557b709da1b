use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result, anyhow};
use blog_api_client::{
    ApiClient, ApiError, Config, Credentials, NewUser, Post, PostDraft, PostPage, Session,
    SessionStore, User, clamp_page,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const SESSION_FILE: &str = ".blog_session";

#[derive(Debug, Parser)]
#[command(name = "blog-api-cli", version, about = "CLI клиент для REST API блога")]
struct Cli {
    /// Базовый URL сервера (по умолчанию из BLOG_API_BASE_URL).
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя с последующим входом.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход и сброс сохранённой сессии.
    Logout,
    /// Пользователь текущей сессии.
    Whoami,
    /// Список постов.
    List {
        /// Номер страницы (с 1).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста (требует вход).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Полное обновление поста (требует вход).
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Удаление поста (требует вход).
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .ok();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.server);
    let session = match load_session().context("не удалось прочитать .blog_session")? {
        Some(stored) => SessionStore::with_session(stored),
        None => SessionStore::new(),
    };
    let client = ApiClient::with_session(config, session);

    let outcome = execute(&client, cli.command).await;

    // Файл сессии отражает состояние хранилища: после logout или после
    // отклонённого сервером токена устаревшая сессия удаляется с диска.
    let cleanup = if client.session().is_authenticated() {
        Ok(())
    } else {
        clear_session_file()
    };

    outcome?;
    cleanup.context("не удалось удалить .blog_session")?;
    Ok(())
}

async fn execute(client: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Register {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let new_user = NewUser {
                username: username.clone(),
                email,
                password: password.clone(),
                first_name,
                last_name,
            };
            client.register(&new_user).await.map_err(map_client_error)?;

            // Регистрация не создаёт сессию: сразу выполняем вход.
            let auth = client
                .login(&Credentials { username, password })
                .await
                .map_err(map_client_error)?;
            persist_session(client).context("не удалось сохранить сессию")?;
            print_user("Регистрация успешна, вход выполнен", &auth.user);
        }
        Command::Login { username, password } => {
            let auth = client
                .login(&Credentials { username, password })
                .await
                .map_err(map_client_error)?;
            persist_session(client).context("не удалось сохранить сессию")?;
            print_user("Вход выполнен", &auth.user);
        }
        Command::Logout => {
            client.logout().await.map_err(map_client_error)?;
            println!("Выход выполнен");
        }
        Command::Whoami => {
            let user = client.current_user().await.map_err(map_client_error)?;
            print_user("Текущий пользователь", &user);
        }
        Command::List { page } => {
            let (page, list) = fetch_page(client, page).await?;
            print_list(page, &list, client.session().user().as_ref());
        }
        Command::Get { id } => {
            let post = client.get_post(id).await.map_err(map_client_error)?;
            print_post("Пост", &post);
        }
        Command::Create { title, content } => {
            let post = client
                .create_post(&PostDraft { title, content })
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post);
        }
        Command::Update { id, title, content } => {
            let post = client
                .update_post(id, &PostDraft { title, content })
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post);
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
    }

    Ok(())
}

/// Запрашивает страницу листинга; страницу вне диапазона сервер отдаёт
/// как 404, тогда узнаём количество страниц и берём последнюю.
async fn fetch_page(client: &ApiClient, page: u32) -> Result<(u32, PostPage)> {
    match client.list_posts(page).await {
        Ok(list) => Ok((page, list)),
        Err(ApiError::NotFound(_)) if page > 1 => {
            let first = client.list_posts(1).await.map_err(map_client_error)?;
            let clamped = clamp_page(page, first.total_pages());
            if clamped == 1 {
                return Ok((1, first));
            }
            let list = client.list_posts(clamped).await.map_err(map_client_error)?;
            println!("Страница {page} вне диапазона, показана страница {clamped}");
            Ok((clamped, list))
        }
        Err(err) => Err(map_client_error(err)),
    }
}

fn resolve_config(server: Option<String>) -> Config {
    match server {
        Some(server) => Config::new(normalize_server(server)),
        None => Config::from_env(),
    }
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_session(raw: &str) -> Option<Session> {
    serde_json::from_str::<Session>(raw).ok()
}

fn load_session() -> io::Result<Option<Session>> {
    if !Path::new(SESSION_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(SESSION_FILE)?;
    Ok(parse_session(&raw))
}

fn persist_session(client: &ApiClient) -> Result<()> {
    if let Some(session) = client.session().current() {
        let raw = serde_json::to_string(&session).context("не удалось сериализовать сессию")?;
        fs::write(SESSION_FILE, raw).context("не удалось записать .blog_session")?;
    }
    Ok(())
}

fn clear_session_file() -> io::Result<()> {
    if Path::new(SESSION_FILE).exists() {
        fs::remove_file(SESSION_FILE)?;
    }
    Ok(())
}

fn map_client_error(err: ApiError) -> anyhow::Error {
    let message = match &err {
        ApiError::Validation(_) => format!("некорректные данные: {}", err.user_message()),
        ApiError::Unauthorized(_) => format!(
            "требуется вход: выполните `blog-api-cli login ...` ({})",
            err.user_message()
        ),
        ApiError::Forbidden(_) => format!("недостаточно прав: {}", err.user_message()),
        ApiError::NotFound(_) => format!("не найдено: {}", err.user_message()),
        ApiError::Server { .. } => format!("ошибка сервера: {}", err.user_message()),
        ApiError::Unexpected { status, .. } => format!(
            "неожиданный ответ сервера (HTTP {status}): {}",
            err.user_message()
        ),
        ApiError::Network(_) => format!("нет соединения: {}", err.user_message()),
        ApiError::Setup(_) => format!("не удалось выполнить запрос: {}", err.user_message()),
    };
    anyhow!(message)
}

fn print_user(title: &str, user: &User) {
    println!("{title}");
    println!("  id: {}", user.id);
    println!("  username: {}", user.username);
    println!("  email: {}", user.email);
    if !user.first_name.is_empty() || !user.last_name.is_empty() {
        println!("  имя: {} {}", user.first_name, user.last_name);
    }
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("author: {} (id={})", post.author_username, post.author);
    println!("created_at: {}", post.created_at);
    println!("{}", post.content);
}

fn print_list(page: u32, list: &PostPage, current_user: Option<&User>) {
    let total_pages = list.total_pages().max(1);
    println!(
        "Страница {page} из {total_pages} (всего постов: {})",
        list.count
    );

    for post in &list.results {
        let own = current_user.is_some_and(|user| post.is_authored_by(user));
        let marker = if own { ", вы" } else { "" };
        println!(
            "- [{}] {} (автор: {}{marker})",
            post.id, post.title, post.author_username
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:8000".to_string());
        assert_eq!(s, "https://example.com:8000");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:8000".to_string());
        assert_eq!(s, "http://127.0.0.1:8000");
    }

    #[test]
    fn parse_session_reads_token_and_user() {
        let raw = r#"{"token":"abc123","user":{"id":1,"username":"alice","email":"a@example.com","first_name":"","last_name":""}}"#;
        let session = parse_session(raw).expect("session should parse");
        assert_eq!(session.token, "abc123");
        assert_eq!(session.user.username, "alice");
    }

    #[test]
    fn parse_session_rejects_invalid_json() {
        assert!(parse_session("{not-json}").is_none());
    }

    #[test]
    fn resolve_config_uses_custom_server() {
        let config = resolve_config(Some("localhost:9999".to_string()));
        assert_eq!(config.base_url, "http://localhost:9999");
    }
}
