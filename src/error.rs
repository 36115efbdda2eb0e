use std::io;

use http::status::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "desktop")]
use notify::{Error as NotifyError, ErrorKind as NotifyErrorKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum ArborError {
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ArborError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ArborError::Custom(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ArborError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ArborError::NotFound(_) => StatusCode::NOT_FOUND,
            // Protected content without an available protected session is
            // reported as 401 so the client can offer to enter one.
            ArborError::PermissionDenied => StatusCode::UNAUTHORIZED,
            ArborError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ArborError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<toml::de::Error> for ArborError {
    fn from(src: toml::de::Error) -> ArborError {
        ArborError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for ArborError {
    fn from(src: toml::ser::Error) -> ArborError {
        ArborError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<io::Error> for ArborError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => ArborError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => ArborError::PermissionDenied,
            _ => ArborError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

#[cfg(feature = "desktop")]
impl From<NotifyError> for ArborError {
    fn from(notify_error: NotifyError) -> Self {
        match notify_error.kind {
            NotifyErrorKind::Generic(msg) => ArborError::Custom(format!(
                "notify-debouncer: {}, paths: {:?}",
                msg, notify_error.paths
            )),
            NotifyErrorKind::Io(io_error) => ArborError::Custom(format!(
                "notify-debouncer: io error {}, paths: {:?}",
                io_error.kind(),
                notify_error.paths
            )),
            NotifyErrorKind::PathNotFound => ArborError::NotFound(format!(
                "notify-debouncer: path(s) not found: {:?}",
                notify_error.paths
            )),
            NotifyErrorKind::WatchNotFound => ArborError::NotFound(format!(
                "notify-debouncer: watch not found, paths: {:?}",
                notify_error.paths
            )),
            NotifyErrorKind::InvalidConfig(_) => {
                ArborError::Custom("notify-debouncer invalid config".to_string())
            }
            NotifyErrorKind::MaxFilesWatch => {
                ArborError::Custom("notify-debouncer max file watch limit reached".to_string())
            }
        }
    }
}
