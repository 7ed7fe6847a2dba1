//! Thin PostgREST client.
//!
//! Tables live under `/rest/v1/{table}` and are filtered with
//! `column=eq.value` query parameters; edge functions live under
//! `/functions/v1/{name}`. Every request carries the anon key both as
//! `apikey` and as a bearer token.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::extract_backend_message;
use crate::backend::BackendError;
use crate::utils::url::construct_api_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL (e.g., https://xyz.supabase.co)
    pub url: String,
    /// Public anon key
    pub api_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

/// An equality filter, rendered as `column=eq.value`.
pub type Filter<'a> = (&'a str, String);

pub fn eq<'a>(column: &'a str, value: impl ToString) -> Filter<'a> {
    (column, format!("eq.{}", value.to_string()))
}

#[derive(Clone, Debug)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::Transport)?;
        Self::with_client(config, client)
    }

    pub fn with_client(config: SupabaseConfig, client: reqwest::Client) -> Result<Self, BackendError> {
        // Validate the key once so per-request header construction cannot fail.
        HeaderValue::from_str(&config.api_key)
            .map_err(|err| BackendError::Decode(format!("Invalid API key: {err}")))?;
        Ok(Self { config, client })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.config.api_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key)) {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    fn table_url(&self, table: &str) -> String {
        construct_api_url(&self.config.url, &format!("rest/v1/{table}"))
    }

    fn function_url(&self, name: &str) -> String {
        construct_api_url(&self.config.url, &format!("functions/v1/{name}"))
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = extract_backend_message(&response.text().await.unwrap_or_default());
        warn!(action, status = status.as_u16(), %body, "data backend request failed");
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// `SELECT *` with equality filters.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
    ) -> Result<Vec<T>, BackendError> {
        debug!(table, "select");
        let response = self
            .client
            .get(self.table_url(table))
            .headers(self.headers())
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await?;
        Ok(Self::check(response, "select").await?.json().await?)
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<R, BackendError> {
        debug!(table, "insert");
        let response = self
            .client
            .post(self.table_url(table))
            .headers(self.headers())
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let mut rows: Vec<R> = Self::check(response, "insert").await?.json().await?;
        if rows.is_empty() {
            return Err(BackendError::Decode(format!(
                "insert into {table} returned no rows"
            )));
        }
        Ok(rows.remove(0))
    }

    /// Patch matching rows; returns how many rows changed.
    pub async fn update<T: Serialize>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
        patch: &T,
    ) -> Result<usize, BackendError> {
        debug!(table, "update");
        let response = self
            .client
            .patch(self.table_url(table))
            .headers(self.headers())
            .header("Prefer", "return=representation")
            .query(filters)
            .json(patch)
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = Self::check(response, "update").await?.json().await?;
        Ok(rows.len())
    }

    /// Delete matching rows.
    pub async fn delete(&self, table: &str, filters: &[Filter<'_>]) -> Result<(), BackendError> {
        debug!(table, "delete");
        let response = self
            .client
            .delete(self.table_url(table))
            .headers(self.headers())
            .query(filters)
            .send()
            .await?;
        Self::check(response, "delete").await?;
        Ok(())
    }

    /// Invoke an edge function with a JSON body.
    pub async fn invoke<T: Serialize, R: DeserializeOwned>(
        &self,
        function: &str,
        body: &T,
    ) -> Result<R, BackendError> {
        debug!(function, "invoke");
        let response = self
            .client
            .post(self.function_url(function))
            .headers(self.headers())
            .json(body)
            .send()
            .await?;
        Ok(Self::check(response, "invoke").await?.json().await?)
    }
}
