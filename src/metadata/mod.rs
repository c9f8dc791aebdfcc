//! Schema discovery module.
//!
//! This module provides the abstraction the join engine uses to discover
//! the schemas of a connection and the tables of a schema, plus two
//! implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      SchemaProvider (async)                     │
//! │  - list_schemas(connection)                                     │
//! │  - list_tables(connection, schema)                              │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                                   │
//!            ▼                                   ▼
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │   StaticSchemaProvider   │      │     JsonSchemaProvider       │
//! │  (in-memory, injectable  │      │  (catalog document read from │
//! │   failures)              │      │   the connection string)     │
//! └──────────────────────────┘      └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use multitable::metadata::{ConnectionInfo, JsonSchemaProvider, SchemaProvider};
//!
//! let provider = JsonSchemaProvider::new();
//! let conn = ConnectionInfo::new("local", "json", "./sales.json");
//!
//! let schemas = provider.list_schemas(&conn).await?;
//! let tables = provider.list_tables(&conn, "sales").await?;
//! ```

mod json_provider;
mod provider;
mod static_provider;
mod types;

pub use json_provider::{JsonSchemaProvider, JSON_DRIVER};
pub use provider::{ProviderResult, SchemaProvider};
pub use static_provider::StaticSchemaProvider;
pub use types::*;
