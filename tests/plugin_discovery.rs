use std::sync::Arc;

use dicom_codec_registry::{
    codec::{
        jpeg2000::LOSSLESS_NAME, CodecError, CodecParameters, CodecUnavailableError, DicomCodec,
        Jpeg2000Backend, Jpeg2000Codec, Jpeg2000Engine, Jpeg2000Settings, PixelFormat,
    },
    config::SharedCodecConfig,
    dataset::DataSet,
    document::ParametersDocument,
    factory::{CodecFactory, CodecFactoryPlugin, ConfigParseError, ParameterDerivationError},
    host::RegistryHost,
    plugin::PluginCreateError,
    registry::RegistryError,
    transfer_syntax::{self, uids, TransferSyntax},
};

const ACME_NAME: &str = "Acme JPEG 2000 Lossless";

inventory::submit! {
    CodecFactoryPlugin::new("acme_jpeg2000_lossless", create_factory_acme)
}

fn create_factory_acme(host: &RegistryHost) -> Result<Arc<dyn CodecFactory>, PluginCreateError> {
    Ok(Arc::new(AcmeFactory {
        config: host.config().clone(),
        backend: host.jpeg2000_backend().clone(),
    }))
}

/// A third-party JPEG 2000 lossless factory competing with the built-in one.
#[derive(Debug)]
struct AcmeFactory {
    config: SharedCodecConfig,
    backend: Arc<Jpeg2000Backend>,
}

impl CodecFactory for AcmeFactory {
    fn name(&self) -> &str {
        ACME_NAME
    }

    fn enabled(&self) -> bool {
        !self.config.read().is_factory_disabled(ACME_NAME)
    }

    fn codec_transfer_syntax(&self) -> &'static TransferSyntax {
        &transfer_syntax::JPEG_2000_LOSSLESS
    }

    fn codec_parameters_from_dataset(
        &self,
        dataset: &dyn DataSet,
    ) -> Result<CodecParameters, ParameterDerivationError> {
        PixelFormat::from_dataset(dataset)?;
        Ok(CodecParameters::new(
            ACME_NAME,
            self.codec_transfer_syntax(),
            Jpeg2000Settings::lossless(vec![], false, false),
        ))
    }

    fn codec_parameters_from_document(
        &self,
        document: &ParametersDocument,
    ) -> Result<CodecParameters, ConfigParseError> {
        Err(ConfigParseError::NameMismatch {
            expected: "acme_jpeg2000_lossless".to_string(),
            found: document.name().to_string(),
        })
    }

    fn dicom_codec(&self) -> Result<Box<dyn DicomCodec>, CodecUnavailableError> {
        Ok(Box::new(Jpeg2000Codec::new(
            ACME_NAME,
            self.codec_transfer_syntax(),
            self.backend.engine(ACME_NAME)?,
        )))
    }
}

#[derive(Debug)]
struct CopyEngine;

impl Jpeg2000Engine for CopyEngine {
    fn encode(
        &self,
        frame: &[u8],
        _format: &PixelFormat,
        _settings: &Jpeg2000Settings,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(frame.to_vec())
    }

    fn decode(&self, codestream: &[u8], _format: &PixelFormat) -> Result<Vec<u8>, CodecError> {
        Ok(codestream.to_vec())
    }
}

fn host(config: &SharedCodecConfig) -> RegistryHost {
    let _ = env_logger::builder().is_test(true).try_init();
    RegistryHost::new(config.clone()).with_jpeg2000_engine(Arc::new(CopyEngine))
}

#[test]
fn plugin_discovery_ordered_by_identifier() {
    let identifiers: Vec<_> = RegistryHost::plugins()
        .into_iter()
        .map(CodecFactoryPlugin::identifier)
        .collect();
    assert_eq!(
        identifiers,
        vec!["acme_jpeg2000_lossless", "jpeg2000_lossless", "jpeg2000_lossy"]
    );
}

#[test]
fn plugin_discovery_duplicate_enabled_factory() {
    let config = SharedCodecConfig::default();
    let err = host(&config).build_registry().unwrap_err();
    match err {
        RegistryError::DuplicateFactory {
            transfer_syntax,
            name,
            existing,
        } => {
            assert_eq!(transfer_syntax, uids::JPEG_2000_LOSSLESS);
            assert_eq!(name, LOSSLESS_NAME);
            assert_eq!(existing, ACME_NAME);
        }
        err => panic!("unexpected error {err}"),
    }
}

#[test]
fn plugin_discovery_disabled_competitor() {
    let config = SharedCodecConfig::default();
    config.write().disable_factory(ACME_NAME);
    let registry = host(&config).build_registry().unwrap();
    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry.resolve(uids::JPEG_2000_LOSSLESS).unwrap().name(),
        LOSSLESS_NAME
    );

    // Switch providers at runtime
    {
        let mut config = config.write();
        config.enable_factory(ACME_NAME);
        config.disable_factory(LOSSLESS_NAME);
    }
    assert_eq!(
        registry.resolve(uids::JPEG_2000_LOSSLESS).unwrap().name(),
        ACME_NAME
    );
    let codec = registry.codec_for(uids::JPEG_2000_LOSSLESS).unwrap();
    assert_eq!(codec.name(), ACME_NAME);

    // Both enabled: the earliest registered wins
    config.write().enable_factory(LOSSLESS_NAME);
    assert_eq!(
        registry.resolve(uids::JPEG_2000_LOSSLESS).unwrap().name(),
        ACME_NAME
    );
}
