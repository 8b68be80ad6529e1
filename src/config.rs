use serde::Deserialize;

/// Default bound on forwarding hops plus claim nesting levels.
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Endpoint handed to the verifier when building a DID resolver.
    pub resolver_endpoint: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Config {
    pub fn new(resolver_endpoint: impl Into<String>) -> Self {
        Self {
            resolver_endpoint: resolver_endpoint.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
