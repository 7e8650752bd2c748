//! HTTP client for the order/activity query backend.
//!
//! Every query is a JSON `POST {base_url}{path}` with the body
//! `{site, session_id, code, params}`. Responses are decoded into a
//! [`QueryEnvelope`]; state codes are left for the domain to judge.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::domain::outcome::{QueryEnvelope, QueryError};
use crate::ports::{OrderQueryService, QueryKind, QueryRequest};

pub struct HttpOrderQueryService {
    client: Client,
    base_url: String,
    /// Used when the request names no site.
    default_site: i64,
}

impl HttpOrderQueryService {
    pub fn new(base_url: impl Into<String>, site: i64, timeout: Duration) -> Result<Self, QueryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::Transport(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_site: site,
        })
    }

    fn url(&self, kind: &QueryKind) -> String {
        format!("{}{}", self.base_url, kind.path())
    }

    fn payload<'a>(&self, request: &'a QueryRequest) -> BackendPayload<'a> {
        BackendPayload {
            site: request.site.unwrap_or(self.default_site),
            session_id: request.session_id.as_str(),
            code: request.kind.code(),
            params: params_for(&request.kind),
        }
    }
}

fn params_for(kind: &QueryKind) -> Value {
    match kind {
        QueryKind::DepositStatus { identifier } | QueryKind::WithdrawalStatus { identifier } => {
            json!({ "orderNo": identifier.as_str() })
        }
        QueryKind::ActivityList => json!({}),
        QueryKind::ActivityStatus { activity_id } => json!({ "activityId": activity_id }),
    }
}

#[async_trait]
impl OrderQueryService for HttpOrderQueryService {
    #[tracing::instrument(skip(self), fields(code = request.kind.code()))]
    async fn query(&self, request: QueryRequest) -> Result<QueryEnvelope, QueryError> {
        let response = self
            .client
            .post(self.url(&request.kind))
            .json(&self.payload(&request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueryError::Timeout
                } else {
                    QueryError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Backend rejected query");
            return Err(QueryError::Rejected {
                status: status.as_u16(),
            });
        }

        let envelope: QueryEnvelope = response.json().await.map_err(|e| {
            if e.is_timeout() {
                QueryError::Timeout
            } else {
                QueryError::Decode(e.to_string())
            }
        })?;

        tracing::debug!(state = ?envelope.state, "Backend query answered");
        Ok(envelope)
    }
}

#[derive(Debug, Serialize)]
struct BackendPayload<'a> {
    site: i64,
    session_id: &'a str,
    code: &'static str,
    params: Value,
}
