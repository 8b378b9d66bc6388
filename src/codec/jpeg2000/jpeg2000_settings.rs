use derive_more::Display;
use serde::Serialize;

/// JPEG 2000 coding settings.
///
/// Lossless settings always use the reversible wavelet and a compression ratio of 1.
#[derive(Serialize, Clone, PartialEq, Debug, Display)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct Jpeg2000Settings {
    irreversible: bool,
    rate: f32,
    rate_levels: Vec<u32>,
    allow_mct: bool,
    update_photometric_interpretation: bool,
}

/// Keep the quality layer ratios above the target `rate`, highest first.
fn quality_layers(rate: f32, mut rate_levels: Vec<u32>) -> Vec<u32> {
    #[allow(clippy::cast_precision_loss)]
    rate_levels.retain(|level| *level as f32 > rate);
    rate_levels.sort_unstable_by(|a, b| b.cmp(a));
    rate_levels.dedup();
    rate_levels
}

impl Jpeg2000Settings {
    /// Create lossless (reversible) settings.
    #[must_use]
    pub fn lossless(
        rate_levels: Vec<u32>,
        allow_mct: bool,
        update_photometric_interpretation: bool,
    ) -> Self {
        Self {
            irreversible: false,
            rate: 1.0,
            rate_levels: quality_layers(1.0, rate_levels),
            allow_mct,
            update_photometric_interpretation,
        }
    }

    /// Create lossy (irreversible) settings targeting the compression ratio `rate`.
    #[must_use]
    pub fn lossy(
        rate: f32,
        rate_levels: Vec<u32>,
        allow_mct: bool,
        update_photometric_interpretation: bool,
    ) -> Self {
        Self {
            irreversible: true,
            rate,
            rate_levels: quality_layers(rate, rate_levels),
            allow_mct,
            update_photometric_interpretation,
        }
    }

    /// Returns a copy of these settings with the multi-component transform set to `allow_mct`.
    #[must_use]
    pub fn with_allow_mct(&self, allow_mct: bool) -> Self {
        Self {
            allow_mct,
            ..self.clone()
        }
    }

    /// Returns true if the irreversible (9-7) wavelet is used.
    #[must_use]
    pub const fn irreversible(&self) -> bool {
        self.irreversible
    }

    /// Returns the target compression ratio.
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Returns the compression ratios of the additional quality layers, highest first.
    #[must_use]
    pub fn rate_levels(&self) -> &[u32] {
        &self.rate_levels
    }

    /// Returns true if the multi-component transform may be applied.
    #[must_use]
    pub const fn allow_mct(&self) -> bool {
        self.allow_mct
    }

    /// Returns true if encoding reports the photometric interpretation implied by the multi-component transform.
    #[must_use]
    pub const fn update_photometric_interpretation(&self) -> bool {
        self.update_photometric_interpretation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg2000_settings_lossless_rate() {
        let settings = Jpeg2000Settings::lossless(vec![5, 1, 20, 10], true, true);
        assert!(!settings.irreversible());
        assert_eq!(settings.rate(), 1.0);
        assert_eq!(settings.rate_levels(), &[20, 10, 5]);
    }

    #[test]
    fn jpeg2000_settings_lossy_quality_layers() {
        let settings = Jpeg2000Settings::lossy(20.0, vec![10, 1280, 40, 20, 40], false, true);
        assert!(settings.irreversible());
        assert_eq!(settings.rate_levels(), &[1280, 40]);
        assert_eq!(
            settings.to_string(),
            r#"{"irreversible":true,"rate":20.0,"rate_levels":[1280,40],"allow_mct":false,"update_photometric_interpretation":true}"#
        );
    }
}
