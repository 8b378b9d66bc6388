//! Codec factories.
//!
//! A [`CodecFactory`] serves exactly one [`TransferSyntax`].
//! It reports whether it is currently enabled, derives [`CodecParameters`] from a dataset or a [`ParametersDocument`], and produces [`DicomCodec`]s.
//!
//! Parameter derivation is separate from codec instantiation so a [`CodecRegistry`](crate::registry::CodecRegistry) can select a factory from the transfer syntax alone.
//! Parameters are only derived when a dataset is actually transcoded.
//!
//! Factories are registered at compile time as [`CodecFactoryPlugin`]s using the [inventory] crate, and created by a [`RegistryHost`](crate::host::RegistryHost).

use thiserror::Error;

use crate::{
    codec::{CodecParameters, CodecUnavailableError, DicomCodec},
    dataset::{tags, DataSet, Tag},
    document::ParametersDocument,
    plugin::Plugin,
    transfer_syntax::TransferSyntax,
};

/// A codec factory plugin.
pub type CodecFactoryPlugin = Plugin<std::sync::Arc<dyn CodecFactory>>;
inventory::collect!(CodecFactoryPlugin);

/// A codec factory.
pub trait CodecFactory: Send + Sync + core::fmt::Debug {
    /// Returns the stable, human-readable name of the factory.
    fn name(&self) -> &str;

    /// Returns true if the factory may currently be used.
    ///
    /// This is evaluated on every call and reflects administrative configuration and engine availability.
    /// It is cheap and has no side effects.
    fn enabled(&self) -> bool;

    /// Returns the transfer syntax served by this factory.
    fn codec_transfer_syntax(&self) -> &'static TransferSyntax;

    /// Derive codec parameters for encoding or decoding `dataset`.
    ///
    /// The dataset is not modified and the result only depends on its attributes and the factory configuration.
    ///
    /// # Errors
    /// Returns a [`ParameterDerivationError`] if the dataset lacks or has invalid attributes required to determine the parameters.
    fn codec_parameters_from_dataset(
        &self,
        dataset: &dyn DataSet,
    ) -> Result<CodecParameters, ParameterDerivationError>;

    /// Derive codec parameters from an externally supplied parameters document.
    ///
    /// # Errors
    /// Returns a [`ConfigParseError`] if the document is not addressed to this factory or its configuration is invalid.
    fn codec_parameters_from_document(
        &self,
        document: &ParametersDocument,
    ) -> Result<CodecParameters, ConfigParseError>;

    /// Create a new codec.
    ///
    /// The codec binds no parameters: parameters are supplied on each encode or decode call.
    ///
    /// # Errors
    /// Returns [`CodecUnavailableError`] if the codec engine cannot be initialised.
    fn dicom_codec(&self) -> Result<Box<dyn DicomCodec>, CodecUnavailableError>;
}

/// Codec parameters could not be derived from a dataset.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParameterDerivationError {
    /// A required attribute is missing.
    #[error("required attribute {keyword} {tag} is missing")]
    MissingAttribute {
        /// The attribute tag.
        tag: Tag,
        /// The attribute keyword.
        keyword: &'static str,
    },
    /// An attribute has an invalid value.
    #[error("attribute {keyword} {tag} has invalid value {value:?}: {reason}")]
    InvalidAttribute {
        /// The attribute tag.
        tag: Tag,
        /// The attribute keyword.
        keyword: &'static str,
        /// The offending value.
        value: String,
        /// Why the value is invalid.
        reason: String,
    },
}

impl ParameterDerivationError {
    /// Create a [`MissingAttribute`](ParameterDerivationError::MissingAttribute) error.
    #[must_use]
    pub fn missing(tag: Tag) -> Self {
        Self::MissingAttribute {
            tag,
            keyword: tags::keyword(tag).unwrap_or("Unknown"),
        }
    }

    /// Create an [`InvalidAttribute`](ParameterDerivationError::InvalidAttribute) error.
    #[must_use]
    pub fn invalid(tag: Tag, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            tag,
            keyword: tags::keyword(tag).unwrap_or("Unknown"),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns the tag of the offending attribute.
    #[must_use]
    pub const fn tag(&self) -> Tag {
        match self {
            Self::MissingAttribute { tag, .. } | Self::InvalidAttribute { tag, .. } => *tag,
        }
    }
}

/// A parameters document could not be parsed or applied.
#[derive(Debug, Error)]
pub enum ConfigParseError {
    /// The document is not valid JSON.
    #[error("malformed parameters document: {_0}")]
    Malformed(#[source] serde_json::Error),
    /// The document is valid JSON but not a parameters document.
    #[error("invalid parameters document: {_0}")]
    InvalidDocument(String),
    /// The document is addressed to another factory.
    #[error("parameters document {found} is not applicable to {expected}")]
    NameMismatch {
        /// The document name accepted by the factory.
        expected: String,
        /// The document name.
        found: String,
    },
    /// The configuration does not match the factory's configuration schema.
    #[error("invalid configuration for {name}: {reason}")]
    InvalidConfiguration {
        /// The document name.
        name: String,
        /// Why the configuration is invalid.
        reason: String,
    },
    /// A configuration field has an invalid value.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// The configuration field.
        field: &'static str,
        /// Why the value is invalid.
        reason: String,
    },
}
