use std::time::Duration;

/// Переменная окружения с базовым URL REST API.
pub const BASE_URL_ENV: &str = "BLOG_API_BASE_URL";

/// Базовый URL по умолчанию (локальный бэкенд).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
/// Конфигурация клиента.
pub struct Config {
    /// Базовый URL REST API, например `http://127.0.0.1:8000/api`.
    pub base_url: String,
    /// Таймаут установления соединения.
    pub connect_timeout: Duration,
    /// Таймаут запроса целиком.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Config {
    /// Конфигурация с заданным базовым URL и таймаутами по умолчанию.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Читает конфигурацию из окружения.
    ///
    /// Базовый URL берётся из `BLOG_API_BASE_URL`; отсутствующее или пустое
    /// значение заменяется локальным адресом по умолчанию.
    pub fn from_env() -> Self {
        Self::new(resolve_base_url(std::env::var(BASE_URL_ENV).ok()))
    }
}

fn resolve_base_url(raw: Option<String>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_base_url_falls_back_when_unset() {
        assert_eq!(resolve_base_url(None), DEFAULT_BASE_URL);
    }

    #[test]
    fn resolve_base_url_falls_back_when_blank() {
        assert_eq!(resolve_base_url(Some("   ".to_string())), DEFAULT_BASE_URL);
    }

    #[test]
    fn resolve_base_url_trims_value() {
        let url = resolve_base_url(Some("  http://api.example.com/api  ".to_string()));
        assert_eq!(url, "http://api.example.com/api");
    }

    #[test]
    fn default_config_uses_local_backend() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }
}
