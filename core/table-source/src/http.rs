//! FILENAME: core/table-source/src/http.rs
//! PURPOSE: Range reads against a PostgREST-style REST endpoint.
//! CONTEXT: Rows are selected with `?select=` and bounded with the `Range`
//! header (`Range-Unit: items`), which is how hosted Postgres REST gateways
//! page through large tables.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::error::SourceError;
use crate::source::{RangeRequest, TableSource};

fn default_rest_path() -> String {
    "rest/v1".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

/// Connection settings for an HTTP table source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSourceConfig {
    /// e.g. `https://project.example.co`
    pub base_url: String,

    /// Sent as both `apikey` and bearer token when present.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Path between the base URL and the table name.
    #[serde(default = "default_rest_path")]
    pub rest_path: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl HttpSourceConfig {
    pub fn new(base_url: &str) -> Self {
        HttpSourceConfig {
            base_url: base_url.to_string(),
            api_key: None,
            rest_path: default_rest_path(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Full URL of a table endpoint.
    pub fn table_url(&self, table: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.rest_path.trim_matches('/');
        if path.is_empty() {
            format!("{}/{}", base, table)
        } else {
            format!("{}/{}/{}", base, path, table)
        }
    }
}

pub struct HttpSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;
        Ok(HttpSource { client, config })
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }
}

#[async_trait]
impl<R> TableSource<R> for HttpSource
where
    R: DeserializeOwned + Send,
{
    async fn read_range(&self, request: &RangeRequest) -> Result<Vec<R>, SourceError> {
        let Some(last) = request.last_index() else {
            return Ok(Vec::new());
        };

        let mut builder = self
            .client
            .get(self.config.table_url(&request.table))
            .query(&[("select", request.select_clause())])
            .header("Range-Unit", "items")
            .header("Range", format!("{}-{}", request.offset, last));

        if let Some(key) = &self.config.api_key {
            builder = builder.header("apikey", key).bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let rows: Vec<R> = serde_json::from_slice(&bytes)?;
        Ok(rows)
    }
}
