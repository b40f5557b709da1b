use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use validator::ValidationErrors;

/// Сообщение для 401 без поля `detail` в теле ответа.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Please log in again.";

/// Сообщение для 403 без поля `detail`.
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";

/// Сообщение для 404 без поля `detail`.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found.";

/// Сообщение для ответов 5xx без поля `detail`.
pub const SERVER_ERROR_MESSAGE: &str = "Internal Server Error. Please try again later.";

/// Сообщение для прочих неуспешных статусов без поля `detail`.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Сообщение для отправленного запроса, оставшегося без ответа.
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error: Could not connect to the server. Please check your internet connection or try again later.";

/// Сообщение для 400 с пустым телом.
pub const BAD_REQUEST_MESSAGE: &str = "Bad Request.";

const VALIDATION_PREFIX: &str = "Validation Error: ";
const FIELD_SEPARATOR: &str = " | ";

#[derive(Debug, Error)]
/// Ошибки клиента REST API.
///
/// Каждый неуспешный вызов классифицируется ровно в один вариант; исходный
/// статус и/или транспортная ошибка остаются доступными через [`ApiError::status`]
/// и `source`, а готовое сообщение для пользователя — через
/// [`ApiError::user_message`].
pub enum ApiError {
    /// 400: ошибки валидации полей, серверные или локальные.
    #[error("validation error: {0}")]
    Validation(String),

    /// 401: токен отсутствует, просрочен или отозван.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403: операция запрещена для текущего пользователя.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404: ресурс не существует (или страница вне диапазона).
    #[error("not found: {0}")]
    NotFound(String),

    /// 5xx: ошибка на стороне сервера.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение для пользователя.
        message: String,
    },

    /// Прочие неуспешные статусы (например, 409).
    #[error("unexpected http status {status}: {message}")]
    Unexpected {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение для пользователя.
        message: String,
    },

    /// Запрос отправлен, ответ не получен.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Ошибка до отправки запроса или при разборе тела ответа.
    #[error("request setup error: {0}")]
    Setup(#[source] reqwest::Error),
}

/// Результат операций клиента.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Готовое человекочитаемое сообщение для отображения пользователю.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message) => message.clone(),
            Self::Server { message, .. } | Self::Unexpected { message, .. } => message.clone(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Setup(source) => source.to_string(),
        }
    }

    /// HTTP-статус, вызвавший ошибку, если он известен.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Server { status, .. } | Self::Unexpected { status, .. } => Some(*status),
            Self::Network(source) | Self::Setup(source) => {
                source.status().map(|status| status.as_u16())
            }
        }
    }

    /// Классифицирует неуспешный HTTP-ответ по статусу и телу.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let json: Option<Value> = serde_json::from_str(body).ok();
        match status.as_u16() {
            400 => Self::Validation(validation_message(body, json.as_ref())),
            401 => Self::Unauthorized(detail_or(json.as_ref(), UNAUTHORIZED_MESSAGE)),
            403 => Self::Forbidden(detail_or(json.as_ref(), FORBIDDEN_MESSAGE)),
            404 => Self::NotFound(detail_or(json.as_ref(), NOT_FOUND_MESSAGE)),
            status @ 500.. => Self::Server {
                status,
                message: detail_or(json.as_ref(), SERVER_ERROR_MESSAGE),
            },
            status => Self::Unexpected {
                status,
                message: detail_or(json.as_ref(), UNEXPECTED_ERROR_MESSAGE),
            },
        }
    }

    /// Классифицирует транспортную ошибку `reqwest`.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() || err.is_decode() {
            Self::Setup(err)
        } else {
            Self::Network(err)
        }
    }

    /// Переводит локальные ошибки `validator` в то же сообщение, что и
    /// серверный 400 с картой полей.
    pub(crate) fn from_validation(errors: &ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|error| match &error.message {
                        Some(message) => message.to_string(),
                        None => error.code.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (field.to_string(), messages)
            })
            .collect();
        fields.sort();

        let pairs: Vec<String> = fields
            .into_iter()
            .map(|(field, messages)| format!("{field}: {messages}"))
            .collect();
        Self::Validation(format!("{VALIDATION_PREFIX}{}", pairs.join(FIELD_SEPARATOR)))
    }
}

/// Сообщение для 400: карта `поле -> сообщение(я)` либо сырой текст.
fn validation_message(body: &str, json: Option<&Value>) -> String {
    if let Some(Value::Object(fields)) = json {
        let pairs: Vec<String> = fields
            .iter()
            .map(|(field, value)| format!("{field}: {}", field_messages(value)))
            .collect();
        return format!("{VALIDATION_PREFIX}{}", pairs.join(FIELD_SEPARATOR));
    }

    let text = body.trim();
    if text.is_empty() {
        BAD_REQUEST_MESSAGE.to_string()
    } else {
        format!("Bad Request: {text}")
    }
}

fn field_messages(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_message)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_message(other),
    }
}

fn scalar_message(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

fn detail_or(json: Option<&Value>, fallback: &str) -> String {
    json.and_then(|value| value.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: u16, body: &str) -> ApiError {
        let status = StatusCode::from_u16(status).expect("valid status");
        ApiError::from_response(status, body)
    }

    #[test]
    fn bad_request_field_map_mentions_every_field() {
        let body = r#"{"email":["Email already in use."],"username":"Username already in use."}"#;
        let err = classify(400, body);
        assert_eq!(
            err.user_message(),
            "Validation Error: email: Email already in use. | username: Username already in use."
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn bad_request_joins_array_messages_with_comma() {
        let body = r#"{"password":["This field may not be blank.","Ensure this field has at least 8 characters."]}"#;
        let err = classify(400, body);
        assert_eq!(
            err.user_message(),
            "Validation Error: password: This field may not be blank., Ensure this field has at least 8 characters."
        );
    }

    #[test]
    fn bad_request_with_plain_body_keeps_text() {
        let err = classify(400, "malformed payload");
        assert_eq!(err.user_message(), "Bad Request: malformed payload");
    }

    #[test]
    fn bad_request_with_empty_body_uses_fixed_message() {
        let err = classify(400, "");
        assert_eq!(err.user_message(), BAD_REQUEST_MESSAGE);
    }

    #[test]
    fn unauthorized_prefers_detail() {
        let err = classify(401, r#"{"detail":"Invalid token."}"#);
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.user_message(), "Invalid token.");
    }

    #[test]
    fn unauthorized_without_detail_uses_fixed_message() {
        let err = classify(401, "{}");
        assert_eq!(err.user_message(), UNAUTHORIZED_MESSAGE);
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn forbidden_without_detail_uses_fixed_message() {
        let err = classify(403, "");
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(err.user_message(), FORBIDDEN_MESSAGE);
    }

    #[test]
    fn not_found_without_detail_uses_fixed_message() {
        let err = classify(404, "");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.user_message(), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn not_found_keeps_paginator_detail() {
        let err = classify(404, r#"{"detail":"Invalid page."}"#);
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.user_message(), "Invalid page.");
    }

    #[test]
    fn server_errors_cover_whole_5xx_range() {
        let internal = classify(500, "");
        assert!(matches!(internal, ApiError::Server { status: 500, .. }));
        assert_eq!(internal.user_message(), SERVER_ERROR_MESSAGE);

        let bad_gateway = classify(502, r#"{"detail":"upstream down"}"#);
        assert_eq!(bad_gateway.status(), Some(502));
        assert_eq!(bad_gateway.user_message(), "upstream down");
    }

    #[test]
    fn conflict_maps_to_unexpected_with_fixed_message() {
        let err = classify(409, "{}");
        assert!(matches!(err, ApiError::Unexpected { status: 409, .. }));
        assert_eq!(err.user_message(), UNEXPECTED_ERROR_MESSAGE);
    }

    #[test]
    fn display_includes_classification() {
        let err = classify(404, "");
        assert_eq!(err.to_string(), format!("not found: {NOT_FOUND_MESSAGE}"));
    }
}
