use crate::ordering::OrderError;
use crate::status::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No item occupies index {0}")]
    NoSwapPartner(u32),

    #[error("Collection '{collection}' changed concurrently (expected revision {expected}, found {actual})")]
    Conflict {
        collection: String,
        expected: u64,
        actual: u64,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShopError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ShopError::NotFound(what.into())
    }

    pub fn already_exists(what: impl Into<String>) -> Self {
        ShopError::AlreadyExists(what.into())
    }

    /// The status code the UI sees for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShopError::NotFound(_) | ShopError::NoSwapPartner(_) => StatusCode::NotFound,
            ShopError::AlreadyExists(_) | ShopError::Conflict { .. } => StatusCode::Conflict,
            ShopError::InvalidIndex(_) | ShopError::InvalidInput(_) => StatusCode::BadRequest,
            ShopError::Store(_) | ShopError::Io(_) | ShopError::Serialization(_) => {
                StatusCode::Failure
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ShopError::Conflict { .. })
    }
}

impl From<OrderError> for ShopError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => ShopError::NotFound(format!("Item '{}'", id)),
            OrderError::InvalidIndex(raw) => ShopError::InvalidIndex(raw),
            OrderError::NoSwapPartner(index) => ShopError::NoSwapPartner(index),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
