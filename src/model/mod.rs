//! Tables, fields and the join relationships declared between them.

pub mod relationship;
pub mod table;

pub use relationship::{JoinEndpoint, JoinRelationship};
pub use table::{Field, Table};
