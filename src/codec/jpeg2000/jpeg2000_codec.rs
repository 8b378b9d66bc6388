use std::sync::Arc;

use crate::{
    codec::{
        CodecError, CodecParameters, DicomCodec, EncodedFrame, LossyCompression, PixelFormat,
    },
    transfer_syntax::TransferSyntax,
};

use super::{Jpeg2000Engine, Jpeg2000Settings};

/// The defined term of the JPEG 2000 lossy image compression method.
pub const LOSSY_COMPRESSION_METHOD: &str = "ISO_15444_1";

/// A JPEG 2000 codec.
///
/// Validates frames and parameters, delegates coding to a [`Jpeg2000Engine`], and reports the attribute changes implied by the encoding.
#[derive(Clone, Debug)]
pub struct Jpeg2000Codec {
    name: String,
    transfer_syntax: &'static TransferSyntax,
    engine: Arc<dyn Jpeg2000Engine>,
}

impl Jpeg2000Codec {
    /// Create a new JPEG 2000 codec for the factory named `name`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        transfer_syntax: &'static TransferSyntax,
        engine: Arc<dyn Jpeg2000Engine>,
    ) -> Self {
        Self {
            name: name.into(),
            transfer_syntax,
            engine,
        }
    }

    fn settings<'a>(
        &self,
        parameters: &'a CodecParameters,
    ) -> Result<&'a Jpeg2000Settings, CodecError> {
        parameters.ensure_derived_by(&self.name, self.transfer_syntax)?;
        parameters
            .as_jpeg2000()
            .ok_or_else(|| CodecError::IncompatibleParameters {
                codec: self.name.clone(),
                parameters: parameters.factory().to_string(),
            })
    }

    fn check_format(&self, format: &PixelFormat) -> Result<(), CodecError> {
        if matches!(format.bits_allocated(), 8 | 16) {
            Ok(())
        } else {
            Err(CodecError::UnsupportedPixelFormat {
                codec: self.name.clone(),
                reason: format!("{} bits allocated", format.bits_allocated()),
            })
        }
    }
}

/// Returns true if the multi-component transform applies to frames of `format`.
pub(super) fn mct_applies(format: &PixelFormat) -> bool {
    format.samples_per_pixel() == 3 && format.photometric_interpretation() == "RGB"
}

impl DicomCodec for Jpeg2000Codec {
    fn name(&self) -> &str {
        &self.name
    }

    fn transfer_syntax(&self) -> &'static TransferSyntax {
        self.transfer_syntax
    }

    fn encode(
        &self,
        frame: &[u8],
        format: &PixelFormat,
        parameters: &CodecParameters,
    ) -> Result<EncodedFrame, CodecError> {
        let settings = self.settings(parameters)?;
        self.check_format(format)?;
        if frame.len() as u64 != format.frame_size() {
            return Err(CodecError::UnexpectedFrameSize(
                frame.len(),
                format.frame_size(),
            ));
        }

        let mct = settings.allow_mct() && mct_applies(format);
        let settings = settings.with_allow_mct(mct);
        let data = self.engine.encode(frame, format, &settings)?;
        if data.is_empty() {
            return Err(CodecError::Engine(
                "the engine produced an empty codestream".to_string(),
            ));
        }

        let photometric_interpretation = (mct && settings.update_photometric_interpretation())
            .then(|| {
                if settings.irreversible() {
                    "YBR_ICT".to_string()
                } else {
                    "YBR_RCT".to_string()
                }
            });
        #[allow(clippy::cast_precision_loss)]
        let lossy_compression = settings.irreversible().then(|| {
            LossyCompression::new(
                frame.len() as f64 / data.len() as f64,
                LOSSY_COMPRESSION_METHOD,
            )
        });
        log::debug!(
            "{} encoded {} bytes to {} bytes with {settings}",
            self.name,
            frame.len(),
            data.len()
        );
        Ok(EncodedFrame::new(
            data,
            photometric_interpretation,
            lossy_compression,
        ))
    }

    fn decode(
        &self,
        encoded: &[u8],
        format: &PixelFormat,
        parameters: &CodecParameters,
    ) -> Result<Vec<u8>, CodecError> {
        self.settings(parameters)?;
        self.check_format(format)?;
        let decoded = self.engine.decode(encoded, format)?;
        if decoded.len() as u64 == format.frame_size() {
            Ok(decoded)
        } else {
            Err(CodecError::UnexpectedFrameSize(
                decoded.len(),
                format.frame_size(),
            ))
        }
    }
}
