use derive_more::From;

use crate::transfer_syntax::TransferSyntax;

use super::{jpeg2000::Jpeg2000Settings, CodecError};

/// Codec family specific settings.
#[derive(Clone, Debug, PartialEq, From)]
#[non_exhaustive]
pub enum CodecSettings {
    /// JPEG 2000 settings.
    Jpeg2000(Jpeg2000Settings),
}

/// Parameters for encoding or decoding pixel data with one codec factory's codecs.
///
/// Parameters remember the factory that derived them.
/// A codec rejects parameters derived by any other factory, even one of the same codec family.
#[derive(Clone, Debug, PartialEq)]
pub struct CodecParameters {
    factory: String,
    transfer_syntax: &'static TransferSyntax,
    settings: CodecSettings,
}

impl CodecParameters {
    /// Create new codec parameters derived by the factory named `factory`.
    #[must_use]
    pub fn new(
        factory: impl Into<String>,
        transfer_syntax: &'static TransferSyntax,
        settings: impl Into<CodecSettings>,
    ) -> Self {
        Self {
            factory: factory.into(),
            transfer_syntax,
            settings: settings.into(),
        }
    }

    /// Returns the name of the factory that derived these parameters.
    #[must_use]
    pub fn factory(&self) -> &str {
        &self.factory
    }

    /// Returns the transfer syntax of the factory that derived these parameters.
    #[must_use]
    pub const fn transfer_syntax(&self) -> &'static TransferSyntax {
        self.transfer_syntax
    }

    /// Returns the codec settings.
    #[must_use]
    pub const fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    /// Returns the JPEG 2000 settings, or [`None`] if these are parameters of another codec family.
    #[must_use]
    pub fn as_jpeg2000(&self) -> Option<&Jpeg2000Settings> {
        #[allow(unreachable_patterns)]
        match &self.settings {
            CodecSettings::Jpeg2000(settings) => Some(settings),
            _ => None,
        }
    }

    /// Check that these parameters were derived by the factory of `codec`.
    ///
    /// # Errors
    /// Returns [`CodecError::IncompatibleParameters`] if the factory name or transfer syntax differ.
    pub fn ensure_derived_by(
        &self,
        codec: &str,
        transfer_syntax: &TransferSyntax,
    ) -> Result<(), CodecError> {
        if self.factory == codec && self.transfer_syntax.uid() == transfer_syntax.uid() {
            Ok(())
        } else {
            Err(CodecError::IncompatibleParameters {
                codec: codec.to_string(),
                parameters: self.factory.clone(),
            })
        }
    }
}
