//! Connection context hashing.

use sha2::{Digest, Sha256};

use crate::metadata::ConnectionInfo;

/// Identify the physical source behind a connection.
///
/// Two connections with the same driver and connection string share a
/// context regardless of their names. Returns a 64-character lowercase
/// hexadecimal string.
pub fn connection_context(connection: &ConnectionInfo) -> String {
    let mut hasher = Sha256::new();
    hasher.update(connection.driver.as_bytes());
    hasher.update([0u8]);
    hasher.update(connection.connection_string.as_bytes());
    format!("{:x}", hasher.finalize())
}
