//! Compile-time plugin registration.
//!
//! A [`Plugin`] creates an object from a [`RegistryHost`].
//! It is used to make [codec factories](crate::factory::CodecFactoryPlugin) discoverable without the host naming every implementation.
//!
//! Plugins are registered at compile time using the [inventory] crate.
//! At runtime, a [`RegistryHost`] iterates the registered plugins, creates each one, and registers the result.

use thiserror::Error;

use crate::host::RegistryHost;

/// A plugin.
pub struct Plugin<TPlugin> {
    /// the identifier of the plugin.
    identifier: &'static str,
    /// Create an implementation of this plugin from a host.
    create_fn: fn(host: &RegistryHost) -> Result<TPlugin, PluginCreateError>,
}

/// A plugin creation error.
#[derive(Error, Debug)]
pub enum PluginCreateError {
    /// The plugin could not be created from the host.
    #[error("failed to create plugin {identifier}: {reason}")]
    Failed {
        /// The plugin identifier.
        identifier: &'static str,
        /// Why creation failed.
        reason: String,
    },
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for PluginCreateError {
    fn from(err_string: &str) -> Self {
        Self::Other(err_string.to_string())
    }
}

impl From<String> for PluginCreateError {
    fn from(err_string: String) -> Self {
        Self::Other(err_string)
    }
}

impl<TPlugin> Plugin<TPlugin> {
    /// Create a new plugin for registration.
    pub const fn new(
        identifier: &'static str,
        create_fn: fn(host: &RegistryHost) -> Result<TPlugin, PluginCreateError>,
    ) -> Self {
        Self {
            identifier,
            create_fn,
        }
    }

    /// Create a `TPlugin` plugin from `host`.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginCreateError`] if plugin creation fails.
    pub fn create(&self, host: &RegistryHost) -> Result<TPlugin, PluginCreateError> {
        (self.create_fn)(host)
    }

    /// Returns the identifier of the plugin.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        self.identifier
    }
}

impl<TPlugin> core::fmt::Debug for Plugin<TPlugin> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Plugin")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
