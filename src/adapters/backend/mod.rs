//! Order/activity query backend adapters.

mod http_query_service;
mod mock_query_service;

pub use http_query_service::HttpOrderQueryService;
pub use mock_query_service::MockOrderQueryService;
