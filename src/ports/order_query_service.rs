//! Order Query Service Port - the order/activity status backend.
//!
//! Each query is one-shot. Transport faults, timeouts and undecodable replies
//! come back as [`QueryError`]; state codes and payload shape are judged by the
//! domain error classifier.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::extraction::Identifier;
use crate::domain::foundation::SessionId;
use crate::domain::outcome::{QueryEnvelope, QueryError};

#[async_trait]
pub trait OrderQueryService: Send + Sync {
    async fn query(&self, request: QueryRequest) -> Result<QueryEnvelope, QueryError>;
}

/// What to ask the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryKind {
    DepositStatus { identifier: Identifier },
    WithdrawalStatus { identifier: Identifier },
    ActivityList,
    ActivityStatus { activity_id: String },
}

impl QueryKind {
    /// Backend operation code.
    pub fn code(&self) -> &'static str {
        match self {
            QueryKind::DepositStatus { .. } => "A001",
            QueryKind::WithdrawalStatus { .. } => "A002",
            QueryKind::ActivityList => "A003",
            QueryKind::ActivityStatus { .. } => "A004",
        }
    }

    /// Backend path relative to the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            QueryKind::DepositStatus { .. } => "/query/recharge_status",
            QueryKind::WithdrawalStatus { .. } => "/query/withdrawal_status",
            QueryKind::ActivityList => "/query/activity_list",
            QueryKind::ActivityStatus { .. } => "/query/user_eligibility",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub session_id: SessionId,
    pub kind: QueryKind,
    /// Site of the requesting platform; adapters fall back to their configured site.
    pub site: Option<i64>,
}

impl QueryRequest {
    pub fn new(session_id: SessionId, kind: QueryKind) -> Self {
        Self {
            session_id,
            kind,
            site: None,
        }
    }

    pub fn with_site(mut self, site: i64) -> Self {
        self.site = Some(site);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_backend_numbering() {
        let id = Identifier::new("123456789012345678").unwrap();
        assert_eq!(QueryKind::DepositStatus { identifier: id.clone() }.code(), "A001");
        assert_eq!(QueryKind::WithdrawalStatus { identifier: id }.code(), "A002");
        assert_eq!(QueryKind::ActivityList.code(), "A003");
        assert_eq!(
            QueryKind::ActivityStatus { activity_id: "7".into() }.path(),
            "/query/user_eligibility"
        );
    }
}
