use std::sync::Arc;

use crate::{
    codec::{CodecParameters, CodecUnavailableError, DicomCodec, PixelFormat},
    config::{CodecConfig, SharedCodecConfig},
    dataset::{tags, DataSet},
    document::ParametersDocument,
    factory::{CodecFactory, CodecFactoryPlugin, ConfigParseError, ParameterDerivationError},
    host::RegistryHost,
    plugin::PluginCreateError,
    transfer_syntax::{self, TransferSyntax},
};

use super::{
    jpeg2000_codec::mct_applies, Jpeg2000Backend, Jpeg2000Codec, Jpeg2000LosslessConfiguration,
    Jpeg2000LossyConfiguration, Jpeg2000Settings,
};

/// The identifier of the JPEG 2000 lossless codec factory and its parameters documents.
pub const LOSSLESS_IDENTIFIER: &str = "jpeg2000_lossless";

/// The identifier of the JPEG 2000 lossy codec factory and its parameters documents.
pub const LOSSY_IDENTIFIER: &str = "jpeg2000_lossy";

/// The name of the JPEG 2000 lossless codec factory.
pub const LOSSLESS_NAME: &str = "JPEG 2000 Lossless";

/// The name of the JPEG 2000 lossy codec factory.
pub const LOSSY_NAME: &str = "JPEG 2000 Lossy";

// Register the factories.
inventory::submit! {
    CodecFactoryPlugin::new(LOSSLESS_IDENTIFIER, create_factory_jpeg2000_lossless)
}
inventory::submit! {
    CodecFactoryPlugin::new(LOSSY_IDENTIFIER, create_factory_jpeg2000_lossy)
}

fn create_factory_jpeg2000_lossless(
    host: &RegistryHost,
) -> Result<Arc<dyn CodecFactory>, PluginCreateError> {
    Ok(Arc::new(Jpeg2000LosslessCodecFactory::new(
        host.config().clone(),
        host.jpeg2000_backend().clone(),
    )))
}

fn create_factory_jpeg2000_lossy(
    host: &RegistryHost,
) -> Result<Arc<dyn CodecFactory>, PluginCreateError> {
    Ok(Arc::new(Jpeg2000LossyCodecFactory::new(
        host.config().clone(),
        host.jpeg2000_backend().clone(),
    )))
}

/// Read the pixel format of `dataset` and check that JPEG 2000 can represent it.
fn jpeg2000_pixel_format(dataset: &dyn DataSet) -> Result<PixelFormat, ParameterDerivationError> {
    let format = PixelFormat::from_dataset(dataset)?;
    if matches!(format.bits_allocated(), 8 | 16) {
        Ok(format)
    } else {
        Err(ParameterDerivationError::invalid(
            tags::BITS_ALLOCATED,
            format.bits_allocated().to_string(),
            "JPEG 2000 encoding requires 8 or 16 bits allocated",
        ))
    }
}

fn check_document_name(
    document: &ParametersDocument,
    identifier: &str,
) -> Result<(), ConfigParseError> {
    if document.name() == identifier {
        Ok(())
    } else {
        Err(ConfigParseError::NameMismatch {
            expected: identifier.to_string(),
            found: document.name().to_string(),
        })
    }
}

fn check_rate_levels(rate_levels: &[u32]) -> Result<(), ConfigParseError> {
    if rate_levels.contains(&0) {
        Err(ConfigParseError::InvalidValue {
            field: "rate_levels",
            reason: "compression ratios must be positive".to_string(),
        })
    } else {
        Ok(())
    }
}

fn is_valid_ratio(ratio: f64) -> bool {
    ratio.is_finite() && ratio > 1.0
}

/// The JPEG 2000 Image Compression (Lossless Only) codec factory.
///
/// Parameters always select the reversible wavelet with a compression ratio of 1.
#[derive(Debug)]
pub struct Jpeg2000LosslessCodecFactory {
    config: SharedCodecConfig,
    backend: Arc<Jpeg2000Backend>,
    transfer_syntax: &'static TransferSyntax,
}

impl Jpeg2000LosslessCodecFactory {
    /// Create a new JPEG 2000 lossless codec factory.
    #[must_use]
    pub fn new(config: SharedCodecConfig, backend: Arc<Jpeg2000Backend>) -> Self {
        Self {
            config,
            backend,
            transfer_syntax: &transfer_syntax::JPEG_2000_LOSSLESS,
        }
    }

    fn parameters(&self, settings: Jpeg2000Settings) -> CodecParameters {
        CodecParameters::new(LOSSLESS_NAME, self.transfer_syntax, settings)
    }
}

impl CodecFactory for Jpeg2000LosslessCodecFactory {
    fn name(&self) -> &str {
        LOSSLESS_NAME
    }

    fn enabled(&self) -> bool {
        !self.config.read().is_factory_disabled(LOSSLESS_NAME)
            && !self.backend.is_known_unavailable()
    }

    fn codec_transfer_syntax(&self) -> &'static TransferSyntax {
        self.transfer_syntax
    }

    fn codec_parameters_from_dataset(
        &self,
        dataset: &dyn DataSet,
    ) -> Result<CodecParameters, ParameterDerivationError> {
        let format = jpeg2000_pixel_format(dataset)?;
        let settings = {
            let config = self.config.read();
            Jpeg2000Settings::lossless(
                config.rate_levels().to_vec(),
                config.allow_multi_component_transform() && mct_applies(&format),
                config.update_photometric_interpretation(),
            )
        };
        log::debug!("{LOSSLESS_NAME} derived {settings} from dataset");
        Ok(self.parameters(settings))
    }

    fn codec_parameters_from_document(
        &self,
        document: &ParametersDocument,
    ) -> Result<CodecParameters, ConfigParseError> {
        check_document_name(document, LOSSLESS_IDENTIFIER)?;
        let Jpeg2000LosslessConfiguration::V1(configuration) = document.to_configuration()?;
        let settings = {
            let config = self.config.read();
            let rate_levels = configuration
                .rate_levels
                .unwrap_or_else(|| config.rate_levels().to_vec());
            check_rate_levels(&rate_levels)?;
            Jpeg2000Settings::lossless(
                rate_levels,
                configuration
                    .allow_mct
                    .unwrap_or(config.allow_multi_component_transform()),
                configuration
                    .update_photometric_interpretation
                    .unwrap_or(config.update_photometric_interpretation()),
            )
        };
        log::debug!("{LOSSLESS_NAME} derived {settings} from document");
        Ok(self.parameters(settings))
    }

    fn dicom_codec(&self) -> Result<Box<dyn DicomCodec>, CodecUnavailableError> {
        let engine = self.backend.engine(LOSSLESS_NAME)?;
        Ok(Box::new(Jpeg2000Codec::new(
            LOSSLESS_NAME,
            self.transfer_syntax,
            engine,
        )))
    }
}

/// The JPEG 2000 Image Compression codec factory.
///
/// Parameters always select the irreversible wavelet with a target compression ratio.
/// The factory is disabled while [lossy encoding](crate::config::CodecConfig#lossy-encoding-enabled) is switched off.
#[derive(Debug)]
pub struct Jpeg2000LossyCodecFactory {
    config: SharedCodecConfig,
    backend: Arc<Jpeg2000Backend>,
    transfer_syntax: &'static TransferSyntax,
}

impl Jpeg2000LossyCodecFactory {
    /// Create a new JPEG 2000 lossy codec factory.
    #[must_use]
    pub fn new(config: SharedCodecConfig, backend: Arc<Jpeg2000Backend>) -> Self {
        Self {
            config,
            backend,
            transfer_syntax: &transfer_syntax::JPEG_2000,
        }
    }

    fn parameters(&self, settings: Jpeg2000Settings) -> CodecParameters {
        CodecParameters::new(LOSSY_NAME, self.transfer_syntax, settings)
    }

    /// The target ratio for `dataset`: the ratio recorded by a previous lossy compression, or the configured default.
    fn target_ratio(
        dataset: &dyn DataSet,
        config: &CodecConfig,
    ) -> Result<f32, ParameterDerivationError> {
        let previously_lossy = dataset.get_str(tags::LOSSY_IMAGE_COMPRESSION) == Some("01");
        match dataset.attribute(tags::LOSSY_IMAGE_COMPRESSION_RATIO) {
            Some(value) if previously_lossy => {
                let ratio = value.first_f64().filter(|ratio| is_valid_ratio(*ratio));
                #[allow(clippy::cast_possible_truncation)]
                ratio.map(|ratio| ratio as f32).ok_or_else(|| {
                    ParameterDerivationError::invalid(
                        tags::LOSSY_IMAGE_COMPRESSION_RATIO,
                        value.to_display_string(),
                        "expected a compression ratio greater than 1",
                    )
                })
            }
            _ => Ok(config.default_lossy_ratio()),
        }
    }
}

impl CodecFactory for Jpeg2000LossyCodecFactory {
    fn name(&self) -> &str {
        LOSSY_NAME
    }

    fn enabled(&self) -> bool {
        let config = self.config.read();
        config.lossy_encoding_enabled()
            && !config.is_factory_disabled(LOSSY_NAME)
            && !self.backend.is_known_unavailable()
    }

    fn codec_transfer_syntax(&self) -> &'static TransferSyntax {
        self.transfer_syntax
    }

    fn codec_parameters_from_dataset(
        &self,
        dataset: &dyn DataSet,
    ) -> Result<CodecParameters, ParameterDerivationError> {
        let format = jpeg2000_pixel_format(dataset)?;
        let settings = {
            let config = self.config.read();
            Jpeg2000Settings::lossy(
                Self::target_ratio(dataset, &config)?,
                config.rate_levels().to_vec(),
                config.allow_multi_component_transform() && mct_applies(&format),
                config.update_photometric_interpretation(),
            )
        };
        log::debug!("{LOSSY_NAME} derived {settings} from dataset");
        Ok(self.parameters(settings))
    }

    fn codec_parameters_from_document(
        &self,
        document: &ParametersDocument,
    ) -> Result<CodecParameters, ConfigParseError> {
        check_document_name(document, LOSSY_IDENTIFIER)?;
        let Jpeg2000LossyConfiguration::V1(configuration) = document.to_configuration()?;
        let settings = {
            let config = self.config.read();
            let ratio = configuration
                .ratio
                .unwrap_or_else(|| config.default_lossy_ratio());
            if !is_valid_ratio(f64::from(ratio)) {
                return Err(ConfigParseError::InvalidValue {
                    field: "ratio",
                    reason: format!("{ratio} is not a compression ratio greater than 1"),
                });
            }
            let rate_levels = configuration
                .rate_levels
                .unwrap_or_else(|| config.rate_levels().to_vec());
            check_rate_levels(&rate_levels)?;
            Jpeg2000Settings::lossy(
                ratio,
                rate_levels,
                configuration
                    .allow_mct
                    .unwrap_or(config.allow_multi_component_transform()),
                configuration
                    .update_photometric_interpretation
                    .unwrap_or(config.update_photometric_interpretation()),
            )
        };
        log::debug!("{LOSSY_NAME} derived {settings} from document");
        Ok(self.parameters(settings))
    }

    fn dicom_codec(&self) -> Result<Box<dyn DicomCodec>, CodecUnavailableError> {
        let engine = self.backend.engine(LOSSY_NAME)?;
        Ok(Box::new(Jpeg2000Codec::new(
            LOSSY_NAME,
            self.transfer_syntax,
            engine,
        )))
    }
}
