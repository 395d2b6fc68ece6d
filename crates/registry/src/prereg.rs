//! Startup hooks that populate registries before the freeze point.
//!
//! Hosts collect [`PreRegistration`] implementations (one per extension)
//! and run them against a registrar once, in a fixed order, before freezing.

use tracing::info;

use crate::RegistryError;

/// A hook that registers entries into `R` during startup.
pub trait PreRegistration<R: ?Sized>: Send + Sync {
    /// Stable identifier used in logs and errors.
    fn id(&self) -> &str;

    /// Register this hook's entries.
    fn register(&self, registrar: &mut R) -> Result<(), RegistryError>;
}

/// Ordered list of hooks.
pub struct PreRegistrations<R: ?Sized> {
    hooks: Vec<Box<dyn PreRegistration<R>>>,
}

impl<R: ?Sized> Default for PreRegistrations<R> {
    fn default() -> Self {
        Self { hooks: Vec::new() }
    }
}

impl<R: ?Sized> PreRegistrations<R> {
    /// Creates an empty hook list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook; hooks run in insertion order.
    pub fn push(&mut self, hook: impl PreRegistration<R> + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Hook identifiers in run order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().map(|hook| hook.id())
    }

    /// Number of hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no hooks were added.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every hook against `registrar`, stopping at the first failure.
    pub fn run(&self, registrar: &mut R) -> Result<(), RegistryError> {
        for hook in &self.hooks {
            info!(hook = hook.id(), "running pre-registration hook");
            hook.register(registrar)
                .map_err(|source| RegistryError::Hook {
                    hook: hook.id().to_string(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}
