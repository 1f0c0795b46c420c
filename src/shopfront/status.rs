//! # Status Envelope
//!
//! Every operation exposed to a UI answers with the same shape:
//!
//! ```json
//! { "status": { "code": 200, "flag": "success", "message": "Product added" } }
//! ```
//!
//! List-returning operations attach the materialized list under `items`.
//!
//! The numeric codes are a closed set (200/400/404/409/500) that existing admin screens
//! branch on, so they are defined once here as [`StatusCode`] rather than written out at
//! each call site.

use crate::error::ShopError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success,
    BadRequest,
    NotFound,
    Conflict,
    Failure,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        match self {
            StatusCode::Success => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::Conflict => 409,
            StatusCode::Failure => 500,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Success),
            400 => Some(StatusCode::BadRequest),
            404 => Some(StatusCode::NotFound),
            409 => Some(StatusCode::Conflict),
            500 => Some(StatusCode::Failure),
            _ => None,
        }
    }
}

impl Serialize for StatusCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u16::deserialize(deserializer)?;
        StatusCode::from_u16(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown status code {}", code)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: StatusCode,
    pub flag: Flag,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::Success,
            flag: Flag::Success,
            message: message.into(),
        }
    }

    pub fn failed(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            flag: Flag::Failed,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.flag == Flag::Success
    }
}

impl From<&ShopError> for Status {
    fn from(err: &ShopError) -> Self {
        Status::failed(err.status_code(), err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, items: Option<Vec<T>>) -> Self {
        Self {
            status: Status::success(message),
            items,
        }
    }

    pub fn failed(err: &ShopError) -> Self {
        Self {
            status: Status::from(err),
            items: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn code(&self) -> u16 {
        self.status.code.as_u16()
    }

    /// The items, or an empty slice for envelopes that carry none.
    pub fn items(&self) -> &[T] {
        self.items.as_deref().unwrap_or(&[])
    }
}
