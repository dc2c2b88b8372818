//! Wire types for the fuel-credit backend.

use super::ApiError;
use crate::fuel::Grade;
use serde::{Deserialize, Serialize};

// Customer side

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub phone: String,
    pub pin: String,
}

/// Who is logged in, with the balance as of the login call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionUser {
    pub customer_id: String,
    pub name: String,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaxLitersRequest {
    pub grade: Grade,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaxLitersResponse {
    pub max_liters: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest {
    pub pump_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionResponse {
    pub token: String,
}

/// Pump authorization issued by the backend. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionToken {
    type Error = ApiError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        if token.trim().is_empty() {
            return Err(ApiError::InvalidResponse("empty session token"));
        }
        Ok(SessionToken(token))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmRequest {
    pub token: String,
    pub liters: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Receipt {
    pub receipt_no: String,
    pub grade: String,
    pub liters: f64,
    pub total: f64,
    pub new_balance: f64,
}

impl Receipt {
    pub(super) fn validated(self) -> Result<Self, ApiError> {
        if self.receipt_no.trim().is_empty() {
            return Err(ApiError::InvalidResponse("confirmation has no receipt number"));
        }
        Ok(self)
    }
}

// Owner side

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub balance: Option<f64>,
}

impl Customer {
    pub fn balance(&self) -> f64 {
        self.balance.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub pin: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopUpRequest {
    pub amount: f64,
}
