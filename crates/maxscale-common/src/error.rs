use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("unexpected status code {status} for url {url}")]
    Status { url: String, status: u16 },
    #[error("unexpected content type {content_type:?} for url {url}")]
    ContentType { url: String, content_type: String },
    #[error("failed to decode {context}: {message}")]
    Decode { context: String, message: String },
    #[error("duration label {label:?} does not resolve to a known bucket bound")]
    BucketShape { label: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    pub fn decode(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Status { .. } => "status",
            Self::ContentType { .. } => "content_type",
            Self::Decode { .. } => "decode",
            Self::BucketShape { .. } => "bucket_shape",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;

#[cfg(test)]
mod tests {
    use super::ExporterError;

    #[test]
    fn decode_helper_keeps_context() {
        let err = ExporterError::decode("/servers", "expected value at line 1 column 1");
        assert_eq!(err.kind(), "decode");
        assert_eq!(
            err.to_string(),
            "failed to decode /servers: expected value at line 1 column 1"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: ExporterError = std::io::Error::other("boom").into();
        assert_eq!(err.kind(), "io");
    }
}
