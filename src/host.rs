//! The registry host.
//!
//! A [`RegistryHost`] owns what codec factories need from their environment: the [`SharedCodecConfig`] and the codec engine backends.
//! It discovers the [`CodecFactoryPlugin`]s registered at compile time, creates a factory from each, and registers them with a [`CodecRegistry`].
//!
//! ```
//! # use dicom_codec_registry::{config::SharedCodecConfig, host::RegistryHost, transfer_syntax::uids};
//! let config = SharedCodecConfig::default();
//! config.write().set_lossy_encoding_enabled(false);
//! let registry = RegistryHost::new(config.clone()).build_registry()?;
//!
//! // No JPEG 2000 engine was supplied, so both factories are disabled
//! assert!(registry.resolve(uids::JPEG_2000_LOSSLESS).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use itertools::Itertools;

use crate::{
    codec::{Jpeg2000Backend, Jpeg2000Engine},
    config::SharedCodecConfig,
    factory::{CodecFactory, CodecFactoryPlugin},
    plugin::PluginCreateError,
    registry::{CodecRegistry, RegistryError},
};

/// The host of a [`CodecRegistry`].
#[derive(Clone, Debug, Default)]
pub struct RegistryHost {
    config: SharedCodecConfig,
    jpeg2000: Arc<Jpeg2000Backend>,
}

impl RegistryHost {
    /// Create a new host with `config` and no codec engines.
    #[must_use]
    pub fn new(config: SharedCodecConfig) -> Self {
        Self {
            config,
            jpeg2000: Arc::new(Jpeg2000Backend::unavailable()),
        }
    }

    /// Set the JPEG 2000 engine backend.
    #[must_use]
    pub fn with_jpeg2000_backend(mut self, backend: Jpeg2000Backend) -> Self {
        self.jpeg2000 = Arc::new(backend);
        self
    }

    /// Set an already initialised JPEG 2000 engine.
    #[must_use]
    pub fn with_jpeg2000_engine(self, engine: Arc<dyn Jpeg2000Engine>) -> Self {
        self.with_jpeg2000_backend(Jpeg2000Backend::with_engine(engine))
    }

    /// Returns the shared codec configuration.
    #[must_use]
    pub const fn config(&self) -> &SharedCodecConfig {
        &self.config
    }

    /// Returns the JPEG 2000 engine backend.
    #[must_use]
    pub const fn jpeg2000_backend(&self) -> &Arc<Jpeg2000Backend> {
        &self.jpeg2000
    }

    /// Returns the registered codec factory plugins, ordered by identifier.
    #[must_use]
    pub fn plugins() -> Vec<&'static CodecFactoryPlugin> {
        inventory::iter::<CodecFactoryPlugin>
            .into_iter()
            .sorted_by_key(|plugin| plugin.identifier())
            .collect()
    }

    /// Create a factory from every registered plugin, ordered by plugin identifier.
    ///
    /// # Errors
    /// Returns a [`PluginCreateError`] if a plugin fails to create its factory.
    pub fn create_factories(&self) -> Result<Vec<Arc<dyn CodecFactory>>, PluginCreateError> {
        Self::plugins()
            .into_iter()
            .map(|plugin| {
                plugin.create(self).map_err(|err| match err {
                    PluginCreateError::Other(reason) => PluginCreateError::Failed {
                        identifier: plugin.identifier(),
                        reason,
                    },
                    err @ PluginCreateError::Failed { .. } => err,
                })
            })
            .collect()
    }

    /// Create a factory from every registered plugin and register it with `registry`.
    ///
    /// # Errors
    /// Returns a [`RegistryError`] if a plugin fails to create its factory or a factory cannot be registered.
    /// Factories registered before the error remain registered.
    pub fn register_all(&self, registry: &CodecRegistry) -> Result<(), RegistryError> {
        let factories = self.create_factories()?;
        log::debug!(
            "registering codec factories {}",
            factories.iter().map(|factory| factory.name()).join(", ")
        );
        for factory in factories {
            registry.register(factory)?;
        }
        Ok(())
    }

    /// Create a registry holding a factory from every registered plugin.
    ///
    /// # Errors
    /// Returns a [`RegistryError`] if a plugin fails to create its factory or a factory cannot be registered.
    /// A [`RegistryError::DuplicateFactory`] must halt initialisation: deployments resolve it by disabling all but one of the conflicting factories.
    pub fn build_registry(&self) -> Result<CodecRegistry, RegistryError> {
        let registry = CodecRegistry::new();
        self.register_all(&registry)?;
        log::info!(
            "codec registry built with {} factories, enabled: {}",
            registry.len(),
            registry.list_enabled().names().join(", ")
        );
        Ok(registry)
    }
}
