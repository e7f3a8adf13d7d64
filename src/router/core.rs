//! Router core: the routing table shared by every registry.

use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::radix::RadixTree;
use crate::error::ConfigError;
use crate::operation::Operation;

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered `(name, value)` pairs extracted from a request.
///
/// Names come from the route tree or the query string; order is significant
/// because binding is positional.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One registered route: verb, versioned template and the operation behind it.
#[derive(Debug)]
pub struct RouteEntry {
    pub method: Method,
    /// Versioned template, e.g. `/api/v1/song/:id`.
    pub path: String,
    pub operation: Arc<Operation>,
}

/// Result of matching a request against the table.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub entry: Arc<RouteEntry>,
    /// Placeholder values in template order, percent-decoded.
    pub path_params: ParamVec,
}

impl RouteMatch {
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.entry.operation
    }
}

/// Method + path routing table.
///
/// Mutated only during startup; afterwards it is wrapped in an `Arc` and
/// read without locks.
#[derive(Clone, Default)]
pub struct Router {
    tree: RadixTree,
    entries: Vec<Arc<RouteEntry>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `operation` under `method` and the versioned `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPathTemplate`] for malformed templates and
    /// [`ConfigError::DuplicateRoute`] when the pair is already taken.
    pub fn insert(
        &mut self,
        method: Method,
        path: &str,
        operation: Arc<Operation>,
    ) -> Result<(), ConfigError> {
        validate_template(path)?;
        let entry = Arc::new(RouteEntry {
            method: method.clone(),
            path: path.to_string(),
            operation,
        });

        if let Err(existing) = self.tree.insert(Arc::clone(&entry)) {
            return Err(ConfigError::DuplicateRoute {
                method,
                path: path.to_string(),
                existing: existing.operation.name.clone(),
                duplicate: entry.operation.name.clone(),
            });
        }

        debug!(
            method = %method,
            path = %path,
            operation = %entry.operation.name,
            "Route registered"
        );
        self.entries.push(entry);
        Ok(())
    }

    /// Match a request path (without query string).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let started = Instant::now();
        let found = self.tree.search(method, path);
        let duration_us = started.elapsed().as_micros();

        match found {
            Some((entry, path_params)) => {
                debug!(
                    method = %method,
                    path = %path,
                    operation = %entry.operation.name,
                    route_pattern = %entry.path,
                    duration_us,
                    "Route matched"
                );
                Some(RouteMatch { entry, path_params })
            }
            None => {
                warn!(method = %method, path = %path, duration_us, "No route matched");
                None
            }
        }
    }

    /// Registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteEntry>] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log a summary of the table.
    pub fn log_summary(&self) {
        let summary: Vec<String> = self
            .entries
            .iter()
            .take(16)
            .map(|e| format!("{} {}", e.method, e.path))
            .collect();
        info!(
            routes_count = self.entries.len(),
            routes_summary = ?summary,
            routing_algorithm = "radix_tree",
            "Routing table loaded"
        );
    }
}

fn validate_template(template: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidPathTemplate {
        template: template.to_string(),
        reason,
    };

    if !template.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if template.contains(['?', '#']) {
        return Err(invalid("must not contain a query or fragment"));
    }
    for segment in template.split('/') {
        if segment == ":" {
            return Err(invalid("placeholder without a name"));
        }
        if segment.chars().skip(1).any(|c| c == ':') {
            return Err(invalid("placeholder must span a whole segment"));
        }
    }
    Ok(())
}
