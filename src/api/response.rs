//! API response helpers

use axum::Json;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::service;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: Option<V>,
    location: Option<String>,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data: Some(data),
            location: None,
        }
    }

    /// Created, pointing the `Location` header to the new resource
    pub fn created(data: V, location: String) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            data: Some(data),
            location: Some(location),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT,
            data: None,
            location: None,
        }
    }
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        let mut response = if let Some(data) = self.data {
            (self.status_code, Json(data)).into_response()
        } else {
            self.status_code.into_response()
        };

        if let Some(location) = self.location.and_then(|l| HeaderValue::from_str(&l).ok()) {
            response.headers_mut().insert(LOCATION, location);
        }

        response
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    kind: &'static str,
    message: String,
    description: Option<String>,
}

impl Error {
    /// Malformed request, before any service is involved
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            message: message.to_string(),
            description: None,
        }
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::NOT_FOUND,
            kind: "not_found",
            message: message.to_string(),
            description: None,
        }
    }

    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal",
            message: message.to_string(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description<M>(self, description: M) -> Self
    where
        M: ToString,
    {
        Self {
            description: Some(description.to_string()),
            ..self
        }
    }
}

impl From<service::Error> for Error {
    fn from(err: service::Error) -> Self {
        use service::Error as E;

        let (status_code, message, description) = match &err {
            E::InvalidUrl(reason) => (StatusCode::BAD_REQUEST, "Invalid URL", Some(reason)),
            E::InvalidExpiry(reason) => {
                (StatusCode::BAD_REQUEST, "Invalid expiry date", Some(reason))
            }
            E::NotFound => (StatusCode::NOT_FOUND, "Short code not found", None),
            E::Expired => (StatusCode::GONE, "Short code has expired", None),
            E::GenerationExhausted => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not generate a unique short code",
                None,
            ),
            E::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage unavailable, try again later",
                None,
            ),
        };

        if status_code.is_server_error() {
            tracing::error!("{err}");
        }

        Self {
            status_code,
            kind: err.kind(),
            message: message.to_string(),
            description: description.cloned(),
        }
    }
}

#[derive(Serialize)]
struct ErrorWrapper {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorWrapper {
                error: self.kind,
                message: self.message,
                description: self.description,
            }),
        )
            .into_response()
    }
}
