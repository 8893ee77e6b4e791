//! Errors raised while converting a validated value.
//!
//! Format steps only run after the format's rules accepted the value, so
//! these are rare in practice. They surface as [`StepError::Invalid`].

use openparams::error::StepError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("value is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded value is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("value is not a valid date: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("value is not a valid UUID: {0}")]
    Uuid(#[from] uuid::Error),

    #[error("`{0}` is not a yes/no value")]
    NotYesNo(String),
}

impl FormatError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Base64(_) => "FORMAT_BASE64",
            Self::Utf8(_) => "FORMAT_UTF8",
            Self::Date(_) => "FORMAT_DATE",
            Self::Uuid(_) => "FORMAT_UUID",
            Self::NotYesNo(_) => "FORMAT_YES_NO",
        }
    }
}

impl From<FormatError> for StepError {
    fn from(error: FormatError) -> Self {
        tracing::trace!(code = error.code(), %error, "format conversion failed");
        Self::invalid(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_to_invalid_step_error() {
        let step: StepError = FormatError::NotYesNo("maybe".into()).into();
        assert_eq!(step.to_string(), "`maybe` is not a yes/no value");
        assert!(matches!(step, StepError::Invalid(_)));
    }

    #[test]
    fn codes_are_stable() {
        let err = FormatError::from(String::from_utf8(vec![0xff]).unwrap_err());
        assert_eq!(err.code(), "FORMAT_UTF8");
    }
}
