//! # Caller identity
//!
//! The registry only needs the acting identity's organizational group to
//! evaluate `writers` and `readers`. Resolving that group from certificates
//! or tokens belongs to the embedding transport.

/// Identity of the caller of one operation
pub trait Identity: Send + Sync {
    /// The caller's organizational group (e.g. `org1MSP`)
    fn caller_group(&self) -> &str;
}

/// Identity fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerGroup(String);

impl CallerGroup {
    pub fn new(group: impl Into<String>) -> Self {
        Self(group.into())
    }
}

impl Identity for CallerGroup {
    fn caller_group(&self) -> &str {
        &self.0
    }
}
