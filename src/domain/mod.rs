//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalog` - Workflow catalog: keywords, templates, routes, thresholds
//! - `extraction` - Fixed-length identifier extraction from free text
//! - `outcome` - Status tables, response envelope and error classification
//! - `auth` - Credential token verification
//! - `intent` - Intent classification strategy chain
//! - `workflow` - Stage state machine and the image interrupt

pub mod auth;
pub mod catalog;
pub mod extraction;
pub mod foundation;
pub mod intent;
pub mod outcome;
pub mod workflow;
