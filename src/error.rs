use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A single failing field in a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Validation failed: {}", join_fields(.0))]
    ValidationError(Vec<FieldError>),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Insufficient stock for {name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        item_id: String,
        name: String,
        available: u32,
        requested: u32,
    },
    #[error("Access denied: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Store operation timed out")]
    Timeout,
    #[error("Request timed out")]
    RequestTimeout,
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ShopError {
    /// Shorthand for a validation failure on a single field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError(vec![FieldError::new(field, message)])
    }

    pub fn item_not_found(id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: "Item",
            id: id.to_string(),
        }
    }

    pub fn order_not_found(id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: "Order",
            id: id.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }

    /// Machine-readable kind carried by every error response.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "ValidationError",
            Self::NotFound { .. } => "NotFound",
            Self::InsufficientStock { .. } => "InsufficientStock",
            Self::Forbidden(_) => "Forbidden",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Timeout => "Timeout",
            Self::RequestTimeout => "RequestTimeout",
            Self::InternalError(_) => "InternalError",
        }
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(e: serde_json::Error) -> Self {
        Self::InternalError(Box::new(e))
    }
}

impl From<csv::Error> for ShopError {
    fn from(e: csv::Error) -> Self {
        Self::InternalError(Box::new(e))
    }
}

impl From<std::io::Error> for ShopError {
    fn from(e: std::io::Error) -> Self {
        Self::InternalError(Box::new(e))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for ShopError {
    fn from(e: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
