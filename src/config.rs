//! Codec configuration options.

use std::{collections::BTreeSet, sync::Arc};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Configuration options for codec factories.
///
/// A [`CodecConfig`] is shared between a [`RegistryHost`](crate::host::RegistryHost) and the factories it creates through a [`SharedCodecConfig`].
/// Changes are visible to the next call of [`CodecFactory::enabled`](crate::factory::CodecFactory::enabled) or parameter derivation.
///
/// # Administrative Options
///
/// ## Disabled Factories
/// > default: none
///
/// Factories named here report themselves as disabled and are never returned by [`CodecRegistry::resolve`](crate::registry::CodecRegistry::resolve).
///
/// ## Lossy Encoding Enabled
/// > default: [`true`]
///
/// If disabled, every factory serving a lossy transfer syntax reports itself as disabled.
/// Deployments that must not re-encode images lossily for regulatory reasons switch this off while keeping lossless codecs available.
///
/// # Parameter Defaults
///
/// ## Default Lossy Ratio
/// > default: `20.0`
///
/// The target compression ratio of lossy encoding when neither the dataset nor a parameters document supplies one.
/// Must be finite and greater than 1.
///
/// ## Rate Levels
/// > default: `[1280, 640, 320, 160, 80, 40, 20, 10, 5]`
///
/// The compression ratios of the progressive quality layers written in addition to the target ratio.
///
/// ## Allow Multi-Component Transform
/// > default: [`true`]
///
/// If enabled, colour (`RGB`) images are encoded with the JPEG 2000 multi-component transform.
///
/// ## Update Photometric Interpretation
/// > default: [`true`]
///
/// If enabled, encoding reports the photometric interpretation implied by the multi-component transform (`YBR_RCT` or `YBR_ICT`) so the caller can update the dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct CodecConfig {
    disabled_factories: BTreeSet<String>,
    lossy_encoding_enabled: bool,
    default_lossy_ratio: f32,
    rate_levels: Vec<u32>,
    allow_multi_component_transform: bool,
    update_photometric_interpretation: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            disabled_factories: BTreeSet::new(),
            lossy_encoding_enabled: true,
            default_lossy_ratio: 20.0,
            rate_levels: vec![1280, 640, 320, 160, 80, 40, 20, 10, 5],
            allow_multi_component_transform: true,
            update_photometric_interpretation: true,
        }
    }
}

impl CodecConfig {
    /// Returns true if the factory named `name` has been [disabled](#disabled-factories).
    #[must_use]
    pub fn is_factory_disabled(&self, name: &str) -> bool {
        self.disabled_factories.contains(name)
    }

    /// Returns the names of the [disabled factories](#disabled-factories).
    #[must_use]
    pub fn disabled_factories(&self) -> &BTreeSet<String> {
        &self.disabled_factories
    }

    /// [Disable](#disabled-factories) the factory named `name`.
    ///
    /// Returns false if it was already disabled.
    pub fn disable_factory(&mut self, name: &str) -> bool {
        self.disabled_factories.insert(name.to_string())
    }

    /// Re-enable the factory named `name`.
    ///
    /// Returns false if it was not disabled.
    pub fn enable_factory(&mut self, name: &str) -> bool {
        self.disabled_factories.remove(name)
    }

    /// Get the [lossy encoding enabled](#lossy-encoding-enabled) configuration.
    #[must_use]
    pub fn lossy_encoding_enabled(&self) -> bool {
        self.lossy_encoding_enabled
    }

    /// Set the [lossy encoding enabled](#lossy-encoding-enabled) configuration.
    pub fn set_lossy_encoding_enabled(&mut self, lossy_encoding_enabled: bool) {
        self.lossy_encoding_enabled = lossy_encoding_enabled;
    }

    /// Get the [default lossy ratio](#default-lossy-ratio) configuration.
    #[must_use]
    pub fn default_lossy_ratio(&self) -> f32 {
        self.default_lossy_ratio
    }

    /// Set the [default lossy ratio](#default-lossy-ratio) configuration.
    ///
    /// # Errors
    /// Returns [`InvalidLossyRatioError`] and keeps the current ratio if `default_lossy_ratio` is not finite or not greater than 1.
    pub fn set_default_lossy_ratio(
        &mut self,
        default_lossy_ratio: f32,
    ) -> Result<(), InvalidLossyRatioError> {
        if default_lossy_ratio.is_finite() && default_lossy_ratio > 1.0 {
            self.default_lossy_ratio = default_lossy_ratio;
            Ok(())
        } else {
            Err(InvalidLossyRatioError(default_lossy_ratio))
        }
    }

    /// Get the [rate levels](#rate-levels) configuration.
    #[must_use]
    pub fn rate_levels(&self) -> &[u32] {
        &self.rate_levels
    }

    /// Set the [rate levels](#rate-levels) configuration.
    pub fn set_rate_levels(&mut self, rate_levels: Vec<u32>) {
        self.rate_levels = rate_levels;
    }

    /// Get the [allow multi-component transform](#allow-multi-component-transform) configuration.
    #[must_use]
    pub fn allow_multi_component_transform(&self) -> bool {
        self.allow_multi_component_transform
    }

    /// Set the [allow multi-component transform](#allow-multi-component-transform) configuration.
    pub fn set_allow_multi_component_transform(&mut self, allow_multi_component_transform: bool) {
        self.allow_multi_component_transform = allow_multi_component_transform;
    }

    /// Get the [update photometric interpretation](#update-photometric-interpretation) configuration.
    #[must_use]
    pub fn update_photometric_interpretation(&self) -> bool {
        self.update_photometric_interpretation
    }

    /// Set the [update photometric interpretation](#update-photometric-interpretation) configuration.
    pub fn set_update_photometric_interpretation(
        &mut self,
        update_photometric_interpretation: bool,
    ) {
        self.update_photometric_interpretation = update_photometric_interpretation;
    }
}

/// An invalid default lossy ratio.
#[derive(Copy, Clone, Debug, Error)]
#[error("invalid default lossy ratio {0}, must be a finite value greater than 1")]
pub struct InvalidLossyRatioError(f32);

/// A shared, mutable handle to a [`CodecConfig`].
///
/// Clones refer to the same configuration.
/// Readers always observe a complete configuration: a toggle is never seen half-applied.
#[derive(Clone, Debug, Default)]
pub struct SharedCodecConfig(Arc<RwLock<CodecConfig>>);

impl SharedCodecConfig {
    /// Create a new shared handle to `config`.
    #[must_use]
    pub fn new(config: CodecConfig) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    /// Returns a read guard of the configuration.
    ///
    /// Do not hold the guard across a call that may write the configuration on the same thread.
    pub fn read(&self) -> RwLockReadGuard<'_, CodecConfig> {
        self.0.read()
    }

    /// Returns a write guard of the configuration.
    pub fn write(&self) -> RwLockWriteGuard<'_, CodecConfig> {
        self.0.write()
    }
}

impl From<CodecConfig> for SharedCodecConfig {
    fn from(config: CodecConfig) -> Self {
        Self::new(config)
    }
}
