//! DICOM pixel data codecs.
//!
//! A [`DicomCodec`] encodes native pixel data of one frame into a compressed transfer syntax and decodes it back.
//! Codecs are produced by a [`CodecFactory`](crate::factory::CodecFactory) and bind no parameters:
//! the [`CodecParameters`] derived by the same factory are supplied to every [`encode`](DicomCodec::encode) and [`decode`](DicomCodec::decode) call.
//!
//! The compression engines themselves are external collaborators, see [`jpeg2000::Jpeg2000Engine`].

pub mod jpeg2000;

mod codec_parameters;
mod pixel_format;

pub use codec_parameters::{CodecParameters, CodecSettings};
pub use pixel_format::PixelFormat;

pub use jpeg2000::{
    Jpeg2000Backend, Jpeg2000Codec, Jpeg2000Engine, Jpeg2000LosslessCodecFactory,
    Jpeg2000LossyCodecFactory, Jpeg2000Settings,
};

use thiserror::Error;

use crate::{
    dataset::{tags, AttributeValue, Tag},
    transfer_syntax::TransferSyntax,
};

/// Lossy compression applied while encoding a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LossyCompression {
    ratio: f64,
    method: &'static str,
}

impl LossyCompression {
    /// Create a new lossy compression record.
    #[must_use]
    pub fn new(ratio: f64, method: &'static str) -> Self {
        Self { ratio, method }
    }

    /// Returns the achieved compression ratio (native size / encoded size).
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Returns the defined term of the compression method, e.g. `ISO_15444_1`.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }
}

/// An encoded frame and the attribute changes that encoding implies.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedFrame {
    data: Vec<u8>,
    photometric_interpretation: Option<String>,
    lossy_compression: Option<LossyCompression>,
}

impl EncodedFrame {
    /// Create a new encoded frame.
    #[must_use]
    pub fn new(
        data: Vec<u8>,
        photometric_interpretation: Option<String>,
        lossy_compression: Option<LossyCompression>,
    ) -> Self {
        Self {
            data,
            photometric_interpretation,
            lossy_compression,
        }
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame and return the encoded bytes.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the photometric interpretation of the encoded frame, if encoding changed it.
    #[must_use]
    pub fn photometric_interpretation(&self) -> Option<&str> {
        self.photometric_interpretation.as_deref()
    }

    /// Returns the lossy compression applied, if any.
    #[must_use]
    pub const fn lossy_compression(&self) -> Option<&LossyCompression> {
        self.lossy_compression.as_ref()
    }

    /// Returns the attributes a caller must set on the dataset holding the encoded frame.
    #[must_use]
    pub fn attribute_updates(&self) -> Vec<(Tag, AttributeValue)> {
        let mut updates = Vec::new();
        if let Some(photometric_interpretation) = &self.photometric_interpretation {
            updates.push((
                tags::PHOTOMETRIC_INTERPRETATION,
                AttributeValue::from(photometric_interpretation.as_str()),
            ));
        }
        if let Some(lossy) = &self.lossy_compression {
            updates.push((tags::LOSSY_IMAGE_COMPRESSION, AttributeValue::from("01")));
            updates.push((
                tags::LOSSY_IMAGE_COMPRESSION_RATIO,
                AttributeValue::Strings(vec![format!("{:.2}", lossy.ratio)]),
            ));
            updates.push((
                tags::LOSSY_IMAGE_COMPRESSION_METHOD,
                AttributeValue::from(lossy.method),
            ));
        }
        updates
    }
}

/// A pixel data codec.
pub trait DicomCodec: Send + Sync + core::fmt::Debug {
    /// Returns the name of the factory that produced this codec.
    fn name(&self) -> &str;

    /// Returns the transfer syntax of the encoded representation.
    fn transfer_syntax(&self) -> &'static TransferSyntax;

    /// Encode one native frame.
    ///
    /// # Errors
    /// Returns [`CodecError`] if `parameters` were not produced by this codec's factory, `frame` does not match `format`, or the engine fails.
    fn encode(
        &self,
        frame: &[u8],
        format: &PixelFormat,
        parameters: &CodecParameters,
    ) -> Result<EncodedFrame, CodecError>;

    /// Decode one encoded frame to native pixel data.
    ///
    /// # Errors
    /// Returns [`CodecError`] if `parameters` were not produced by this codec's factory, the engine fails, or the decoded size does not match `format`.
    fn decode(
        &self,
        encoded: &[u8],
        format: &PixelFormat,
        parameters: &CodecParameters,
    ) -> Result<Vec<u8>, CodecError>;
}

/// A codec engine could not be initialised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("codec {codec} is unavailable: {reason}")]
pub struct CodecUnavailableError {
    codec: String,
    reason: String,
}

impl CodecUnavailableError {
    /// Create a new codec unavailable error.
    #[must_use]
    pub fn new(codec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            codec: codec.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the unavailable codec.
    #[must_use]
    pub fn codec(&self) -> &str {
        &self.codec
    }

    /// Returns why the codec is unavailable.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The codec engine is unavailable.
    #[error(transparent)]
    Unavailable(#[from] CodecUnavailableError),
    /// The parameters were produced by a different factory.
    #[error("codec {codec} cannot use parameters produced by {parameters}")]
    IncompatibleParameters {
        /// The codec name.
        codec: String,
        /// The name of the factory that produced the parameters.
        parameters: String,
    },
    /// The size of a native frame did not match what was expected.
    #[error("the size of a native frame is {_0}, expected {_1}")]
    UnexpectedFrameSize(usize, u64),
    /// The pixel format cannot be encoded by this codec.
    #[error("unsupported pixel format for codec {codec}: {reason}")]
    UnsupportedPixelFormat {
        /// The codec name.
        codec: String,
        /// Why the format is unsupported.
        reason: String,
    },
    /// The engine failed to encode or decode.
    #[error("codec engine failure: {_0}")]
    Engine(String),
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for CodecError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for CodecError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_frame_attribute_updates_lossless() {
        let frame = EncodedFrame::new(vec![0; 4], Some("YBR_RCT".to_string()), None);
        assert_eq!(
            frame.attribute_updates(),
            vec![(
                tags::PHOTOMETRIC_INTERPRETATION,
                AttributeValue::from("YBR_RCT")
            )]
        );
    }

    #[test]
    fn encoded_frame_attribute_updates_lossy() {
        let frame = EncodedFrame::new(
            vec![0; 4],
            None,
            Some(LossyCompression::new(12.5, "ISO_15444_1")),
        );
        let updates = frame.attribute_updates();
        assert_eq!(updates.len(), 3);
        assert_eq!(
            updates[1],
            (
                tags::LOSSY_IMAGE_COMPRESSION_RATIO,
                AttributeValue::Strings(vec!["12.50".to_string()])
            )
        );
        assert_eq!(
            updates[2],
            (
                tags::LOSSY_IMAGE_COMPRESSION_METHOD,
                AttributeValue::from("ISO_15444_1")
            )
        );
    }

    #[test]
    fn codec_error_display() {
        let err = CodecError::from(CodecUnavailableError::new("JPEG 2000 Lossless", "no engine"));
        assert_eq!(
            err.to_string(),
            "codec JPEG 2000 Lossless is unavailable: no engine"
        );
        assert_eq!(
            CodecError::UnexpectedFrameSize(3, 4).to_string(),
            "the size of a native frame is 3, expected 4"
        );
    }
}
