//! Identifiers for clients and matches.

use serde::{Deserialize, Serialize};

/// Opaque client identifier assigned by the transport layer.
///
/// Assumed process-unique and stable for as long as the client is seated.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ClientId(u64);

impl ClientId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Unique key of a session in the registry.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Generates a fresh, time-ordered identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Borrows the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
