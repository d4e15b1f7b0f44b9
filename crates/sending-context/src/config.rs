//! Stub configuration.

/// Configuration for a `CodeBaseStub`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubConfig {
    /// How many consecutive remarshal signals one call may absorb before it
    /// fails with `RemarshalLimit`. `None` retries for as long as the
    /// delegate keeps asking. Default: `None`.
    pub max_remarshals: Option<u32>,
}

impl StubConfig {
    /// Stop after `limit` remarshals within a single call.
    pub fn with_max_remarshals(mut self, limit: u32) -> Self {
        self.max_remarshals = Some(limit);
        self
    }

    /// Retry for as long as the delegate signals remarshal.
    pub fn unbounded(mut self) -> Self {
        self.max_remarshals = None;
        self
    }
}
