//! Support Flow - multi-turn customer support workflow engine
//!
//! Each turn is classified into a business type (deposit, withdrawal,
//! activity or human service), advanced through that business type's dialogue
//! stages, and answered from a localized workflow catalog. Order and activity
//! statuses are looked up in an external backend and mapped to a reply plus a
//! control signal that says whether the conversation continues, finishes, or
//! goes to a human agent.
//!
//! The engine is stateless between turns: the caller sends the conversation
//! state returned by the previous turn.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
