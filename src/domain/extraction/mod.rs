//! Structured data extraction from user text.

mod identifier;

pub use identifier::{digit_runs, Identifier, IdentifierExtractor, IDENTIFIER_LENGTH};
