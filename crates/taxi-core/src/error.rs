//! Error types for the taxi-time engine.

use crate::models::VertexId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced by loading, resolution and feature computation.
#[derive(Debug, Error)]
pub enum TaxiError {
    #[error("could not find {column} column in {table} table (headers: {headers})")]
    Schema {
        table: String,
        column: String,
        headers: String,
    },
    #[error("malformed {table} row {row}: {reason}")]
    MalformedRow {
        table: String,
        row: usize,
        reason: String,
    },
    #[error("{0} must have at least two vertices")]
    InsufficientPath(String),
    #[error("vertex {0} not found in coordinate table")]
    Lookup(VertexId),
    #[error("scoring model {model} failed: {reason}")]
    Model { model: String, reason: String },
    #[error("I/O failure: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failure reading CSV: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
    #[error("failure decoding JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Non-fatal problems met while resolving a route string.
///
/// These never abort a resolution; the offending token or ident is skipped
/// and the issue is reported alongside the result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ident", rename_all = "snake_case")]
pub enum RouteIssue {
    #[error("runway designator {0} has no taxiway component, skipped")]
    RunwayDesignator(String),
    #[error("taxiway {0} not found")]
    UnresolvedIdent(String),
    #[error("could not connect {0} to path")]
    DisconnectedSegment(String),
}

pub type Result<T> = std::result::Result<T, TaxiError>;
