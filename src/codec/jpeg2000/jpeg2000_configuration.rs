use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// A wrapper to handle various versions of JPEG 2000 lossless parameters document configurations.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum Jpeg2000LosslessConfiguration {
    /// Version 1.0.
    V1(Jpeg2000LosslessConfigurationV1),
}

/// Configuration parameters for the JPEG 2000 lossless codec factory (version 1.0).
///
/// Absent fields take their value from the [`CodecConfig`](crate::config::CodecConfig).
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Default, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct Jpeg2000LosslessConfigurationV1 {
    /// The compression ratios of progressive quality layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_levels: Option<Vec<u32>>,
    /// Allow the multi-component transform on colour images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_mct: Option<bool>,
    /// Report the photometric interpretation implied by the multi-component transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_photometric_interpretation: Option<bool>,
}

/// A wrapper to handle various versions of JPEG 2000 lossy parameters document configurations.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Display, From)]
#[serde(untagged)]
pub enum Jpeg2000LossyConfiguration {
    /// Version 1.0.
    V1(Jpeg2000LossyConfigurationV1),
}

/// Configuration parameters for the JPEG 2000 lossy codec factory (version 1.0).
///
/// Absent fields take their value from the [`CodecConfig`](crate::config::CodecConfig).
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct Jpeg2000LossyConfigurationV1 {
    /// The target compression ratio. Must be greater than 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f32>,
    /// The compression ratios of progressive quality layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_levels: Option<Vec<u32>>,
    /// Allow the multi-component transform on colour images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_mct: Option<bool>,
    /// Report the photometric interpretation implied by the multi-component transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_photometric_interpretation: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg2000_lossy_configuration_valid() {
        const JSON_VALID: &str = r#"{
        "ratio": 15.0,
        "allow_mct": false
    }"#;
        let Jpeg2000LossyConfiguration::V1(configuration) =
            serde_json::from_str::<Jpeg2000LossyConfiguration>(JSON_VALID).unwrap();
        assert_eq!(configuration.ratio, Some(15.0));
        assert_eq!(configuration.allow_mct, Some(false));
        assert!(configuration.rate_levels.is_none());
    }

    #[test]
    fn jpeg2000_lossy_configuration_empty() {
        let configuration = serde_json::from_str::<Jpeg2000LossyConfiguration>("{}").unwrap();
        assert_eq!(
            configuration,
            Jpeg2000LossyConfiguration::V1(Jpeg2000LossyConfigurationV1::default())
        );
        assert_eq!(configuration.to_string(), "{}");
    }

    #[test]
    fn jpeg2000_lossy_configuration_invalid() {
        const JSON_INVALID1: &str = r#"{
        "ratio": "high"
    }"#;
        assert!(serde_json::from_str::<Jpeg2000LossyConfiguration>(JSON_INVALID1).is_err());
        const JSON_INVALID2: &str = r#"{
        "ratio": 10,
        "quality": 90
    }"#;
        assert!(serde_json::from_str::<Jpeg2000LossyConfiguration>(JSON_INVALID2).is_err());
    }

    #[test]
    fn jpeg2000_lossless_configuration_rejects_ratio() {
        const JSON_INVALID: &str = r#"{
        "ratio": 10
    }"#;
        assert!(serde_json::from_str::<Jpeg2000LosslessConfiguration>(JSON_INVALID).is_err());
    }
}
