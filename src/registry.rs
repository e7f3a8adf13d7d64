//! Versioned operation registry.
//!
//! A registry owns the operations of one API version and installs them into a
//! shared [`Router`] under `/api/v{version}`. Several registries may target the
//! same router, which is how multiple versions share one listener.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::ConfigError;
use crate::operation::Operation;
use crate::router::Router;

pub struct Registry {
    version: u32,
    prefix: String,
    operations: Vec<Arc<Operation>>,
    initialized: bool,
}

impl Registry {
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            version,
            prefix: format!("/api/v{version}"),
            operations: Vec::new(),
            initialized: false,
        }
    }

    /// Add an operation. Chainable.
    #[must_use]
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(Arc::new(operation));
        self
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// `/api/v{version}`
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Versioned path for an unversioned template.
    #[must_use]
    pub fn versioned_path(&self, template: &str) -> String {
        format!("{}{}", self.prefix, template)
    }

    /// Install every operation into `router`.
    ///
    /// Returns the number of routes registered. Nothing is marked initialized
    /// on failure; a partially filled router must not be served.
    ///
    /// # Errors
    ///
    /// [`ConfigError::AlreadyInitialized`] on a second call,
    /// [`ConfigError::NoOperationsDeclared`] for an empty registry, and any
    /// error from [`Router::insert`].
    pub fn start(&mut self, router: &mut Router) -> Result<usize, ConfigError> {
        if self.initialized {
            return Err(ConfigError::AlreadyInitialized {
                version: self.version,
            });
        }
        if self.operations.is_empty() {
            return Err(ConfigError::NoOperationsDeclared {
                version: self.version,
            });
        }

        for operation in &self.operations {
            let path = self.versioned_path(&operation.path_template);
            if let Err(e) = router.insert(operation.method.clone(), &path, Arc::clone(operation)) {
                error!(
                    api_version = self.version,
                    operation = %operation.name,
                    error = %e,
                    "Operation registration failed"
                );
                return Err(e);
            }
        }

        self.initialized = true;
        info!(
            api_version = self.version,
            prefix = %self.prefix,
            operations = self.operations.len(),
            "Registry started"
        );
        Ok(self.operations.len())
    }
}
