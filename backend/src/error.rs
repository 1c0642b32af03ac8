use rocket::http::Status;
use thiserror::Error;

/// Failures surfaced by the video search endpoint.
///
/// The `Display` text is sent verbatim as the `error` field of the response,
/// so it must keep the underlying provider message intact.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} is not configured")]
    MissingCredential(String),

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Provider(String),
}

impl ServiceError {
    pub fn status(&self) -> Status {
        match self {
            ServiceError::MissingCredential(_) => Status::InternalServerError,
            ServiceError::InvalidRequest(_) => Status::BadRequest,
            ServiceError::Provider(_) => Status::BadGateway,
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(e: anyhow::Error) -> Self {
        // alternate formatting keeps the whole context chain on one line
        ServiceError::Provider(format!("{e:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn missing_credential_names_the_variable() {
        let e = ServiceError::MissingCredential("YOUTUBE_API_KEY".to_string());
        assert_eq!(e.to_string(), "YOUTUBE_API_KEY is not configured");
        assert_eq!(e.status(), Status::InternalServerError);
    }

    #[test]
    fn provider_error_keeps_context_chain() {
        let inner: Result<(), _> = Err(anyhow::anyhow!("connection refused"));
        let err = inner.context("YouTube search request failed").unwrap_err();
        let e = ServiceError::from(err);
        assert_eq!(
            e.to_string(),
            "YouTube search request failed: connection refused"
        );
        assert_eq!(e.status(), Status::BadGateway);
    }
}
