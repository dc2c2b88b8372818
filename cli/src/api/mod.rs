//! HTTP Client Module
//!
//! This module provides the client for the fuel-credit backend's JSON API.
//! It includes:
//!
//! - `FuelClient`: a cheap-to-clone handle holding the reqwest client and
//!   the configured base URL
//! - Customer operations (login, max liters, pump sessions, dispense)
//! - Owner operations (list, create, top up)
//! - `ApiError`, the single error type every call returns
//!
//! Non-2xx responses become `ApiError::Status`; bodies that are not the
//! expected JSON become `ApiError::Decode`.

mod error;
mod models;

pub use error::ApiError;
pub use models::{
    ConfirmRequest, Customer, LoginRequest, MaxLitersRequest, MaxLitersResponse, NewCustomer,
    Receipt, SessionToken, SessionUser, StartSessionRequest, StartSessionResponse, TopUpRequest,
};

use crate::config::Config;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

#[derive(Clone)]
pub struct FuelClient {
    http: Client,
    base_url: Url,
}

impl FuelClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("fuelcredit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // Customer operations

    pub async fn login(&self, request: &LoginRequest) -> Result<SessionUser, ApiError> {
        let url = self.url(&["api", "auth", "login"])?;
        self.send(self.http.post(url).json(request)).await
    }

    pub async fn max_liters(&self, customer_id: &str, request: &MaxLitersRequest) -> Result<f64, ApiError> {
        let url = self.url(&["api", "customer", customer_id, "calc-liters"])?;
        let response: MaxLitersResponse = self.send(self.http.post(url).json(request)).await?;
        Ok(response.max_liters)
    }

    pub async fn start_session(
        &self,
        customer_id: &str,
        request: &StartSessionRequest,
    ) -> Result<SessionToken, ApiError> {
        let url = self.url(&["api", "customer", customer_id, "start-session"])?;
        let response: StartSessionResponse = self.send(self.http.post(url).json(request)).await?;
        SessionToken::try_from(response.token)
    }

    pub async fn confirm_dispense(&self, request: &ConfirmRequest) -> Result<Receipt, ApiError> {
        let url = self.url(&["api", "dispense", "confirm"])?;
        let receipt: Receipt = self.send(self.http.post(url).json(request)).await?;
        receipt.validated()
    }

    // Owner operations

    pub async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        let url = self.url(&["api", "owner", "customers"])?;
        self.send(self.http.get(url)).await
    }

    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, ApiError> {
        let url = self.url(&["api", "owner", "customers"])?;
        self.send(self.http.post(url).json(customer)).await
    }

    pub async fn top_up(&self, customer_id: &str, request: &TopUpRequest) -> Result<Customer, ApiError> {
        let url = self.url(&["api", "owner", "customers", customer_id, "topup"])?;
        self.send(self.http.post(url).json(request)).await
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "request failed before a response arrived");
            ApiError::from(e)
        })?;

        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;
        debug!(%url, %status, bytes = body.len(), "backend responded");

        if !status.is_success() {
            return Err(ApiError::status(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::FuelClient;
    use crate::config::Config;
    use axum::Router;
    use std::time::Duration;

    /// Serves `router` on an ephemeral local port and returns a client for it.
    pub async fn mock_backend(router: Router) -> FuelClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = Config::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        FuelClient::new(&config).unwrap()
    }
}
