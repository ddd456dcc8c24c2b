//! Typed HTTP client for the expense tracker API, doing what the data-entry and
//! charting screens do with the raw responses.

use std::cmp::Ordering;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use common::types::{CategorySummary, DateRange, ErrorBody, ExpenseEntry, Health, MessageBody, MonthlyTotal};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("error {status}: {detail}")]
    Status { status: u16, detail: String },
}

#[derive(Debug, Clone)]
pub struct ExpenseApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExpenseApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        let resp = self.http.get(format!("{}/health", self.base_url)).send().await?;
        decode(resp).await
    }

    /// Expenses stored for `date`. A 404 means nothing was recorded and reads as empty.
    pub async fn fetch_expenses(&self, date: NaiveDate) -> Result<Vec<ExpenseEntry>, ClientError> {
        let resp = self.http.get(format!("{}/expenses/{date}", self.base_url)).send().await?;
        decode_or_empty(resp).await
    }

    /// Replace the expenses for `date`. Rows with a non-positive amount are blank form
    /// rows and are dropped before sending.
    pub async fn save_expenses(&self, date: NaiveDate, entries: &[ExpenseEntry]) -> Result<MessageBody, ClientError> {
        let body = filled_rows(entries);
        debug!(%date, submitted = entries.len(), sent = body.len(), "saving expenses");
        let resp = self
            .http
            .post(format!("{}/expenses/{date}", self.base_url))
            .json(&body)
            .send()
            .await?;
        decode(resp).await
    }

    /// Category breakdown, largest share first; empty when the range has no data.
    pub async fn fetch_breakdown(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CategorySummary>, ClientError> {
        let resp = self
            .http
            .post(format!("{}/analytics/", self.base_url))
            .json(&DateRange::new(start, end))
            .send()
            .await?;
        let mut rows: Vec<CategorySummary> = decode_or_empty(resp).await?;
        sort_by_share(&mut rows);
        Ok(rows)
    }

    pub async fn fetch_monthly(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<MonthlyTotal>, ClientError> {
        let resp = self
            .http
            .post(format!("{}/analytics/monthly", self.base_url))
            .json(&DateRange::new(start, end))
            .send()
            .await?;
        decode_or_empty(resp).await
    }
}

pub fn filled_rows(entries: &[ExpenseEntry]) -> Vec<ExpenseEntry> {
    entries.iter().filter(|e| e.amount > 0.0).cloned().collect()
}

pub fn sort_by_share(rows: &mut [CategorySummary]) {
    rows.sort_by(|a, b| b.percentage.partial_cmp(&a.percentage).unwrap_or(Ordering::Equal));
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }
    Err(status_error(status, resp).await)
}

async fn decode_or_empty<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, ClientError> {
    if resp.status() == StatusCode::NOT_FOUND {
        return Ok(Vec::new());
    }
    decode(resp).await
}

async fn status_error(status: StatusCode, resp: reqwest::Response) -> ClientError {
    let text = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text).map(|b| b.detail).unwrap_or(text);
    ClientError::Status { status: status.as_u16(), detail }
}
