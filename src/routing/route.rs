//! Versioned route registrations.

use std::sync::Arc;

use crate::routing::chain::HandlerChain;

/// A handler chain tagged with the version constraint it serves.
///
/// Built once at configuration time and read-only afterwards; the router that
/// owns it shares it across every in-flight request.
#[derive(Debug, Clone)]
pub struct VersionedRoute {
    version: String,
    default: bool,
    name: Option<String>,
    chain: Arc<HandlerChain>,
}

impl VersionedRoute {
    /// Create a non-default route for the given constraint.
    pub fn new(version: impl Into<String>, chain: HandlerChain) -> Self {
        Self {
            version: version.into(),
            default: false,
            name: None,
            chain: Arc::new(chain),
        }
    }

    /// Mark this route as the fallback for unversioned or unmatched requests.
    pub fn default_route(mut self) -> Self {
        self.default = true;
        self
    }

    /// Set the default flag explicitly.
    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    /// Attach a name used in logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name if set, otherwise the constraint.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.version)
    }

    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    pub(crate) fn chain(&self) -> Arc<HandlerChain> {
        Arc::clone(&self.chain)
    }
}
