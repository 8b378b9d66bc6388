//! The codec registry.
//!
//! A [`CodecRegistry`] indexes [`CodecFactory`]s by the transfer syntax they serve and resolves transfer syntax UIDs to an enabled factory.
//!
//! The registry is populated at startup, usually by a [`RegistryHost`](crate::host::RegistryHost), and is read-mostly thereafter.
//! Factory enablement is never cached: every [`resolve`](CodecRegistry::resolve) and every iteration of [`list_enabled`](CodecRegistry::list_enabled) asks each factory whether it is enabled.
//!
//! Registration rejects a factory if its transfer syntax already has an enabled factory and it is itself enabled, or if a factory of the same name is already registered for the syntax.
//! A disabled factory may be registered alongside an enabled one.

use std::{collections::HashMap, sync::Arc};

use itertools::Itertools;
use parking_lot::RwLock;
use thiserror::Error;

use crate::{
    codec::{CodecParameters, CodecUnavailableError, DicomCodec},
    dataset::{tags, DataSet},
    factory::{CodecFactory, ParameterDerivationError},
    plugin::PluginCreateError,
    transfer_syntax::{normalise_uid, TransferSyntax},
};

/// A codec registry error.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No factory is registered for the transfer syntax.
    #[error("no codec factory is registered for transfer syntax {_0}")]
    NotFound(String),
    /// Factories are registered for the transfer syntax, but none is enabled.
    #[error("the codec factories for transfer syntax {transfer_syntax} are disabled: {}", .factories.join(", "))]
    NoEnabledCodec {
        /// The transfer syntax UID.
        transfer_syntax: String,
        /// The names of the disabled factories.
        factories: Vec<String>,
    },
    /// A factory conflicts with a factory already registered for its transfer syntax.
    #[error("codec factory {name} conflicts with {existing} for transfer syntax {transfer_syntax}")]
    DuplicateFactory {
        /// The transfer syntax UID.
        transfer_syntax: String,
        /// The name of the rejected factory.
        name: String,
        /// The name of the registered factory.
        existing: String,
    },
    /// The dataset has no Transfer Syntax UID.
    #[error("the dataset does not specify a transfer syntax UID")]
    TransferSyntaxUnspecified,
    /// Codec parameters could not be derived.
    #[error(transparent)]
    Parameters(#[from] ParameterDerivationError),
    /// A codec could not be instantiated.
    #[error(transparent)]
    Unavailable(#[from] CodecUnavailableError),
    /// A factory plugin could not be created.
    #[error(transparent)]
    Plugin(#[from] PluginCreateError),
}

#[derive(Debug, Default)]
struct Index {
    /// All factories in registration order.
    factories: Vec<Arc<dyn CodecFactory>>,
    /// Factories by transfer syntax UID, in registration order.
    by_transfer_syntax: HashMap<&'static str, Vec<Arc<dyn CodecFactory>>>,
}

/// A registry of codec factories indexed by transfer syntax.
///
/// The registry is [`Sync`] and can be shared between threads.
#[derive(Debug, Default)]
pub struct CodecRegistry {
    index: RwLock<Index>,
}

impl CodecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under its [transfer syntax](CodecFactory::codec_transfer_syntax).
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateFactory`] if
    ///  - a factory with the same name is already registered for the transfer syntax, or
    ///  - `factory` is enabled and an enabled factory is already registered for the transfer syntax.
    pub fn register(&self, factory: Arc<dyn CodecFactory>) -> Result<(), RegistryError> {
        let transfer_syntax = factory.codec_transfer_syntax();
        let mut index = self.index.write();
        let registered = index
            .by_transfer_syntax
            .get(transfer_syntax.uid())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let duplicate = |existing: &Arc<dyn CodecFactory>| RegistryError::DuplicateFactory {
            transfer_syntax: transfer_syntax.uid().to_string(),
            name: factory.name().to_string(),
            existing: existing.name().to_string(),
        };
        if let Some(existing) = registered.iter().find(|f| f.name() == factory.name()) {
            return Err(duplicate(existing));
        }
        let enabled = factory.enabled();
        if enabled {
            if let Some(existing) = registered.iter().find(|f| f.enabled()) {
                return Err(duplicate(existing));
            }
        }

        if transfer_syntax.is_retired() {
            log::warn!(
                "codec factory {} serves the retired transfer syntax {transfer_syntax}",
                factory.name()
            );
        }
        log::debug!(
            "registered codec factory {} for {transfer_syntax} (enabled: {enabled})",
            factory.name()
        );
        index
            .by_transfer_syntax
            .entry(transfer_syntax.uid())
            .or_default()
            .push(factory.clone());
        index.factories.push(factory);
        Ok(())
    }

    /// Returns the factories registered for the transfer syntax `uid`, in registration order.
    fn candidates(&self, uid: &str) -> Option<Vec<Arc<dyn CodecFactory>>> {
        self.index.read().by_transfer_syntax.get(uid).cloned()
    }

    /// Resolve the transfer syntax `uid` to an enabled factory.
    ///
    /// Trailing `UI` value padding (NUL or space) in `uid` is ignored.
    /// If more than one factory for the syntax is enabled, the earliest registered is returned.
    ///
    /// # Errors
    /// Returns
    ///  - [`RegistryError::NotFound`] if no factory is registered for `uid`, or
    ///  - [`RegistryError::NoEnabledCodec`] if every factory registered for `uid` is disabled.
    pub fn resolve(&self, uid: &str) -> Result<Arc<dyn CodecFactory>, RegistryError> {
        let uid = normalise_uid(uid);
        let candidates = self
            .candidates(uid)
            .ok_or_else(|| RegistryError::NotFound(uid.to_string()))?;

        let mut enabled = candidates.iter().filter(|factory| factory.enabled());
        let Some(factory) = enabled.next() else {
            log::debug!("no enabled codec factory for {uid}");
            return Err(RegistryError::NoEnabledCodec {
                transfer_syntax: uid.to_string(),
                factories: candidates.iter().map(|f| f.name().to_string()).collect(),
            });
        };
        let others = enabled.map(|f| f.name()).join(", ");
        if !others.is_empty() {
            log::warn!(
                "several codec factories are enabled for {uid}, using {} over {others}",
                factory.name()
            );
        }
        Ok(factory.clone())
    }

    /// Resolve the Transfer Syntax UID (0002,0010) of `dataset` to an enabled factory.
    ///
    /// # Errors
    /// Returns [`RegistryError::TransferSyntaxUnspecified`] if the dataset has no Transfer Syntax UID, or an error from [`resolve`](CodecRegistry::resolve).
    pub fn resolve_for_dataset(
        &self,
        dataset: &dyn DataSet,
    ) -> Result<Arc<dyn CodecFactory>, RegistryError> {
        let uid = dataset
            .get_str(tags::TRANSFER_SYNTAX_UID)
            .filter(|uid| !uid.is_empty())
            .ok_or(RegistryError::TransferSyntaxUnspecified)?;
        self.resolve(uid)
    }

    /// Resolve the transfer syntax `uid` and create a codec.
    ///
    /// # Errors
    /// Returns an error from [`resolve`](CodecRegistry::resolve), or [`RegistryError::Unavailable`] if the codec cannot be instantiated.
    pub fn codec_for(&self, uid: &str) -> Result<Box<dyn DicomCodec>, RegistryError> {
        Ok(self.resolve(uid)?.dicom_codec()?)
    }

    /// Resolve the transfer syntax `uid` and derive codec parameters for `dataset`.
    ///
    /// # Errors
    /// Returns an error from [`resolve`](CodecRegistry::resolve), or [`RegistryError::Parameters`] if parameters cannot be derived from `dataset`.
    pub fn parameters_for(
        &self,
        uid: &str,
        dataset: &dyn DataSet,
    ) -> Result<CodecParameters, RegistryError> {
        Ok(self
            .resolve(uid)?
            .codec_parameters_from_dataset(dataset)?)
    }

    /// Returns the currently enabled factories.
    ///
    /// The result holds the factories registered when it was created.
    /// Every iteration asks each of them whether it is enabled, so it can be iterated repeatedly and always reflects the live state.
    #[must_use]
    pub fn list_enabled(&self) -> EnabledFactories {
        EnabledFactories {
            factories: self.index.read().factories.clone(),
        }
    }

    /// Returns all registered factories, enabled or not, in registration order.
    #[must_use]
    pub fn factories(&self) -> Vec<Arc<dyn CodecFactory>> {
        self.index.read().factories.clone()
    }

    /// Returns the transfer syntaxes with at least one registered factory, in registration order.
    #[must_use]
    pub fn transfer_syntaxes(&self) -> Vec<&'static TransferSyntax> {
        self.index
            .read()
            .factories
            .iter()
            .map(|factory| factory.codec_transfer_syntax())
            .unique_by(|transfer_syntax| transfer_syntax.uid())
            .collect()
    }

    /// Returns the number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().factories.len()
    }

    /// Returns true if no factories are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.read().factories.is_empty()
    }
}

type EnabledFilter = fn(&&Arc<dyn CodecFactory>) -> bool;

/// An iterator over the enabled factories of [`EnabledFactories`].
pub type EnabledFactoriesIter<'a> =
    core::iter::Filter<core::slice::Iter<'a, Arc<dyn CodecFactory>>, EnabledFilter>;

fn is_enabled(factory: &&Arc<dyn CodecFactory>) -> bool {
    factory.enabled()
}

/// A restartable sequence of the enabled factories of a [`CodecRegistry`].
///
/// See [`CodecRegistry::list_enabled`].
#[derive(Clone, Debug)]
pub struct EnabledFactories {
    factories: Vec<Arc<dyn CodecFactory>>,
}

impl EnabledFactories {
    /// Iterate over the factories that are enabled now, in registration order.
    pub fn iter(&self) -> EnabledFactoriesIter<'_> {
        self.factories.iter().filter(is_enabled as EnabledFilter)
    }

    /// Returns the names of the factories that are enabled now.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|factory| factory.name()).collect()
    }
}

impl<'a> IntoIterator for &'a EnabledFactories {
    type Item = &'a Arc<dyn CodecFactory>;
    type IntoIter = EnabledFactoriesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
