use std::sync::Arc;

use dicom_codec_registry::{
    codec::{
        jpeg2000::{LOSSLESS_NAME, LOSSY_COMPRESSION_METHOD, LOSSY_NAME},
        CodecError, Jpeg2000Engine, Jpeg2000Settings, PixelFormat,
    },
    config::SharedCodecConfig,
    dataset::{tags, AttributeValue, DataSet, InMemoryDataSet, Tag},
    document::ParametersDocument,
    host::RegistryHost,
    registry::CodecRegistry,
    transfer_syntax::uids,
};

/// Run-length encodes frames as (count, value) pairs, refusing settings it cannot honour.
#[derive(Debug)]
struct RunLengthEngine;

impl Jpeg2000Engine for RunLengthEngine {
    fn encode(
        &self,
        frame: &[u8],
        _format: &PixelFormat,
        settings: &Jpeg2000Settings,
    ) -> Result<Vec<u8>, CodecError> {
        if settings.irreversible() && settings.rate() <= 1.0 {
            return Err(CodecError::Engine("invalid lossy rate".to_string()));
        }
        let mut encoded: Vec<u8> = Vec::new();
        for &value in frame {
            match encoded.len() {
                len if len >= 2 && encoded[len - 1] == value && encoded[len - 2] < u8::MAX => {
                    encoded[len - 2] += 1;
                }
                _ => encoded.extend([1, value]),
            }
        }
        Ok(encoded)
    }

    fn decode(&self, codestream: &[u8], _format: &PixelFormat) -> Result<Vec<u8>, CodecError> {
        Ok(codestream
            .chunks(2)
            .flat_map(|pair| std::iter::repeat(pair[1]).take(usize::from(pair[0])))
            .collect())
    }
}

fn registry(config: &SharedCodecConfig) -> CodecRegistry {
    let _ = env_logger::builder().is_test(true).try_init();
    RegistryHost::new(config.clone())
        .with_jpeg2000_engine(Arc::new(RunLengthEngine))
        .build_registry()
        .unwrap()
}

fn rgb_dataset() -> InMemoryDataSet {
    InMemoryDataSet::new()
        .with(tags::ROWS, 4u16)
        .with(tags::COLUMNS, 4u16)
        .with(tags::SAMPLES_PER_PIXEL, 3u16)
        .with(tags::BITS_ALLOCATED, 8u16)
        .with(tags::BITS_STORED, 8u16)
        .with(tags::HIGH_BIT, 7u16)
        .with(tags::PIXEL_REPRESENTATION, 0u16)
        .with(tags::PLANAR_CONFIGURATION, 0u16)
        .with(tags::PHOTOMETRIC_INTERPRETATION, "RGB")
}

fn apply(dataset: &mut InMemoryDataSet, updates: Vec<(Tag, AttributeValue)>) {
    for (tag, value) in updates {
        dataset.put(tag, value);
    }
}

#[test]
fn jpeg2000_lossless_transcode() {
    let config = SharedCodecConfig::default();
    let registry = registry(&config);
    let mut dataset = rgb_dataset();
    let format = PixelFormat::from_dataset(&dataset).unwrap();
    assert_eq!(format.frame_size(), 48);

    let factory = registry.resolve(uids::JPEG_2000_LOSSLESS).unwrap();
    let parameters = factory.codec_parameters_from_dataset(&dataset).unwrap();
    let codec = factory.dicom_codec().unwrap();

    let frame = [vec![10u8; 24], vec![200u8; 24]].concat();
    let encoded = codec.encode(&frame, &format, &parameters).unwrap();
    assert_eq!(encoded.data(), &[24, 10, 24, 200]);
    assert_eq!(
        codec.decode(encoded.data(), &format, &parameters).unwrap(),
        frame
    );

    apply(&mut dataset, encoded.attribute_updates());
    assert_eq!(
        dataset.get_str(tags::PHOTOMETRIC_INTERPRETATION),
        Some("YBR_RCT")
    );
    assert!(!dataset.contains(tags::LOSSY_IMAGE_COMPRESSION));
}

#[test]
fn jpeg2000_lossy_transcode_from_document() {
    let config = SharedCodecConfig::default();
    let registry = registry(&config);
    let mut dataset = rgb_dataset();
    let format = PixelFormat::from_dataset(&dataset).unwrap();

    let document = ParametersDocument::parse(
        r#"{
            "name": "jpeg2000_lossy",
            "configuration": {
                "ratio": 12.0,
                "rate_levels": [80, 40, 20, 10]
            }
        }"#,
    )
    .unwrap();
    let factory = registry.resolve(uids::JPEG_2000).unwrap();
    let parameters = factory.codec_parameters_from_document(&document).unwrap();
    let settings = parameters.as_jpeg2000().unwrap();
    assert_eq!(settings.rate(), 12.0);
    assert_eq!(settings.rate_levels(), &[80, 40, 20]);

    let codec = registry.codec_for(uids::JPEG_2000).unwrap();
    assert_eq!(codec.name(), LOSSY_NAME);
    let frame = vec![7u8; 48];
    let encoded = codec.encode(&frame, &format, &parameters).unwrap();
    assert_eq!(encoded.data().len(), 2);

    apply(&mut dataset, encoded.attribute_updates());
    assert_eq!(
        dataset.get_str(tags::PHOTOMETRIC_INTERPRETATION),
        Some("YBR_ICT")
    );
    assert_eq!(dataset.get_str(tags::LOSSY_IMAGE_COMPRESSION), Some("01"));
    assert_eq!(
        dataset.get_str(tags::LOSSY_IMAGE_COMPRESSION_RATIO),
        Some("24.00")
    );
    assert_eq!(
        dataset.get_str(tags::LOSSY_IMAGE_COMPRESSION_METHOD),
        Some(LOSSY_COMPRESSION_METHOD)
    );

    // Re-encoding the lossy image keeps its previous ratio
    let parameters = factory.codec_parameters_from_dataset(&dataset).unwrap();
    assert_eq!(parameters.as_jpeg2000().unwrap().rate(), 24.0);
}

#[test]
fn jpeg2000_parameters_not_interchangeable() {
    let config = SharedCodecConfig::default();
    let registry = registry(&config);
    let dataset = rgb_dataset();
    let format = PixelFormat::from_dataset(&dataset).unwrap();

    let lossless_parameters = registry
        .parameters_for(uids::JPEG_2000_LOSSLESS, &dataset)
        .unwrap();
    assert_eq!(lossless_parameters.factory(), LOSSLESS_NAME);
    let lossy_codec = registry.codec_for(uids::JPEG_2000).unwrap();
    assert!(matches!(
        lossy_codec.encode(&[0; 48], &format, &lossless_parameters),
        Err(CodecError::IncompatibleParameters { .. })
    ));
}

#[test]
fn jpeg2000_multi_component_transform_disabled() {
    let config = SharedCodecConfig::default();
    config.write().set_allow_multi_component_transform(false);
    let registry = registry(&config);
    let dataset = rgb_dataset();
    let format = PixelFormat::from_dataset(&dataset).unwrap();

    let parameters = registry
        .parameters_for(uids::JPEG_2000_LOSSLESS, &dataset)
        .unwrap();
    assert!(!parameters.as_jpeg2000().unwrap().allow_mct());
    let codec = registry.codec_for(uids::JPEG_2000_LOSSLESS).unwrap();
    let encoded = codec.encode(&[1; 48], &format, &parameters).unwrap();
    assert!(encoded.photometric_interpretation().is_none());
}
