use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
/// Единственный настроенный HTTP-транспорт клиента.
pub(crate) struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub(crate) fn new(config: &Config) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: config.base_url.clone(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Собирает запрос; при наличии токена добавляет ровно один заголовок
    /// `Authorization: Token <значение>`.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> RequestBuilder {
        debug!(%method, path, authenticated = token.is_some(), "api request");

        let mut request = self.client.request(method, self.endpoint(path));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Token {token}"));
        }
        request
    }

    /// Отправляет запрос и десериализует успешный ответ.
    pub(crate) async fn send<T>(&self, request: RequestBuilder) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.check(request).await?;
        response.json::<T>().await.map_err(ApiError::from_reqwest)
    }

    /// Отправляет запрос, тело успешного ответа игнорируется (DELETE, logout).
    pub(crate) async fn send_unit(&self, request: RequestBuilder) -> ApiResult<()> {
        self.check(request).await?;
        Ok(())
    }

    async fn check(&self, request: RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = request.send().await.map_err(ApiError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn decode_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::new(&Config::new("http://localhost:8000/api/"))
    }

    #[test]
    fn endpoint_normalizes_slashes() {
        let transport = transport();
        let full = transport.endpoint("/blogs/");
        assert_eq!(full, "http://localhost:8000/api/blogs/");
    }

    #[test]
    fn request_without_token_has_no_authorization_header() {
        let request = transport()
            .request(Method::GET, "/blogs/", None)
            .build()
            .expect("request should build");
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn request_with_token_has_exactly_one_token_header() {
        let request = transport()
            .request(Method::GET, "/blogs/", Some("abc123"))
            .build()
            .expect("request should build");

        let values: Vec<_> = request.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "Token abc123");
    }

    #[test]
    fn request_targets_joined_url() {
        let request = transport()
            .request(Method::DELETE, "/blogs/42/", Some("abc123"))
            .build()
            .expect("request should build");
        assert_eq!(request.url().as_str(), "http://localhost:8000/api/blogs/42/");
        assert_eq!(request.method(), &Method::DELETE);
    }
}
