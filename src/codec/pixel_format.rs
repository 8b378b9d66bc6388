use crate::{
    dataset::{tags, DataSet, Tag},
    factory::ParameterDerivationError,
};

/// The layout of the native pixel data of one frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    rows: u16,
    columns: u16,
    samples_per_pixel: u16,
    bits_allocated: u16,
    bits_stored: u16,
    high_bit: u16,
    signed: bool,
    photometric_interpretation: String,
    planar_configuration: u16,
}

fn required_u16(dataset: &dyn DataSet, tag: Tag) -> Result<u16, ParameterDerivationError> {
    match dataset.attribute(tag) {
        None => Err(ParameterDerivationError::missing(tag)),
        Some(value) => dataset.get_u16(tag).ok_or_else(|| {
            ParameterDerivationError::invalid(
                tag,
                value.to_display_string(),
                "expected an unsigned 16-bit integer",
            )
        }),
    }
}

fn optional_u16(
    dataset: &dyn DataSet,
    tag: Tag,
    default: u16,
) -> Result<u16, ParameterDerivationError> {
    if dataset.contains(tag) {
        required_u16(dataset, tag)
    } else {
        Ok(default)
    }
}

impl PixelFormat {
    /// Read the pixel format from the image pixel attributes of `dataset`.
    ///
    /// Rows, Columns, Bits Allocated and Photometric Interpretation are required.
    /// Samples per Pixel defaults to 1, Bits Stored to Bits Allocated, High Bit to Bits Stored - 1, and Pixel Representation and Planar Configuration to 0.
    ///
    /// # Errors
    /// Returns a [`ParameterDerivationError`] if a required attribute is missing or an attribute is invalid or inconsistent.
    pub fn from_dataset(dataset: &dyn DataSet) -> Result<Self, ParameterDerivationError> {
        let rows = required_u16(dataset, tags::ROWS)?;
        let columns = required_u16(dataset, tags::COLUMNS)?;
        let bits_allocated = required_u16(dataset, tags::BITS_ALLOCATED)?;
        let photometric_interpretation = dataset
            .get_str(tags::PHOTOMETRIC_INTERPRETATION)
            .filter(|pi| !pi.is_empty())
            .ok_or_else(|| ParameterDerivationError::missing(tags::PHOTOMETRIC_INTERPRETATION))?
            .to_string();
        let samples_per_pixel = optional_u16(dataset, tags::SAMPLES_PER_PIXEL, 1)?;
        let bits_stored = optional_u16(dataset, tags::BITS_STORED, bits_allocated)?;
        let high_bit = optional_u16(dataset, tags::HIGH_BIT, bits_stored.saturating_sub(1))?;
        let pixel_representation = optional_u16(dataset, tags::PIXEL_REPRESENTATION, 0)?;
        let planar_configuration = optional_u16(dataset, tags::PLANAR_CONFIGURATION, 0)?;

        if rows == 0 {
            return Err(ParameterDerivationError::invalid(
                tags::ROWS,
                "0",
                "must be positive",
            ));
        }
        if columns == 0 {
            return Err(ParameterDerivationError::invalid(
                tags::COLUMNS,
                "0",
                "must be positive",
            ));
        }
        if !matches!(bits_allocated, 1 | 8 | 16 | 32) {
            return Err(ParameterDerivationError::invalid(
                tags::BITS_ALLOCATED,
                bits_allocated.to_string(),
                "must be 1, 8, 16 or 32",
            ));
        }
        if bits_stored == 0 || bits_stored > bits_allocated {
            return Err(ParameterDerivationError::invalid(
                tags::BITS_STORED,
                bits_stored.to_string(),
                format!("must be between 1 and bits allocated ({bits_allocated})"),
            ));
        }
        if high_bit >= bits_allocated || high_bit + 1 < bits_stored {
            return Err(ParameterDerivationError::invalid(
                tags::HIGH_BIT,
                high_bit.to_string(),
                format!(
                    "inconsistent with bits stored ({bits_stored}) and bits allocated ({bits_allocated})"
                ),
            ));
        }
        if !matches!(samples_per_pixel, 1 | 3) {
            return Err(ParameterDerivationError::invalid(
                tags::SAMPLES_PER_PIXEL,
                samples_per_pixel.to_string(),
                "must be 1 or 3",
            ));
        }
        if pixel_representation > 1 {
            return Err(ParameterDerivationError::invalid(
                tags::PIXEL_REPRESENTATION,
                pixel_representation.to_string(),
                "must be 0 (unsigned) or 1 (signed)",
            ));
        }
        if planar_configuration > 1 {
            return Err(ParameterDerivationError::invalid(
                tags::PLANAR_CONFIGURATION,
                planar_configuration.to_string(),
                "must be 0 or 1",
            ));
        }

        Ok(Self {
            rows,
            columns,
            samples_per_pixel,
            bits_allocated,
            bits_stored,
            high_bit,
            signed: pixel_representation == 1,
            photometric_interpretation,
            planar_configuration,
        })
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn columns(&self) -> u16 {
        self.columns
    }

    /// Returns the number of samples per pixel.
    #[must_use]
    pub const fn samples_per_pixel(&self) -> u16 {
        self.samples_per_pixel
    }

    /// Returns the number of bits allocated per sample.
    #[must_use]
    pub const fn bits_allocated(&self) -> u16 {
        self.bits_allocated
    }

    /// Returns the number of bits stored per sample.
    #[must_use]
    pub const fn bits_stored(&self) -> u16 {
        self.bits_stored
    }

    /// Returns the most significant bit of a stored sample.
    #[must_use]
    pub const fn high_bit(&self) -> u16 {
        self.high_bit
    }

    /// Returns true if samples are two's complement signed integers.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns the photometric interpretation.
    #[must_use]
    pub fn photometric_interpretation(&self) -> &str {
        &self.photometric_interpretation
    }

    /// Returns the planar configuration (0: interleaved, 1: separate planes).
    #[must_use]
    pub const fn planar_configuration(&self) -> u16 {
        self.planar_configuration
    }

    /// Returns the size in bytes of one native frame.
    #[must_use]
    pub fn frame_size(&self) -> u64 {
        let bits = u64::from(self.rows)
            * u64::from(self.columns)
            * u64::from(self.samples_per_pixel)
            * u64::from(self.bits_allocated);
        bits.div_ceil(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemoryDataSet;

    fn monochrome() -> InMemoryDataSet {
        InMemoryDataSet::new()
            .with(tags::ROWS, 4u16)
            .with(tags::COLUMNS, 3u16)
            .with(tags::BITS_ALLOCATED, 16u16)
            .with(tags::BITS_STORED, 12u16)
            .with(tags::PIXEL_REPRESENTATION, 1u16)
            .with(tags::PHOTOMETRIC_INTERPRETATION, "MONOCHROME2")
    }

    #[test]
    fn pixel_format_defaults() {
        let format = PixelFormat::from_dataset(&monochrome()).unwrap();
        assert_eq!(format.samples_per_pixel(), 1);
        assert_eq!(format.high_bit(), 11);
        assert!(format.is_signed());
        assert_eq!(format.planar_configuration(), 0);
        assert_eq!(format.frame_size(), 4 * 3 * 2);
    }

    #[test]
    fn pixel_format_missing_bits_allocated() {
        let mut dataset = monochrome();
        dataset.remove(tags::BITS_ALLOCATED);
        assert!(matches!(
            PixelFormat::from_dataset(&dataset),
            Err(ParameterDerivationError::MissingAttribute { tag, .. }) if tag == tags::BITS_ALLOCATED
        ));
    }

    #[test]
    fn pixel_format_unparsable_rows() {
        let dataset = monochrome().with(tags::ROWS, "many");
        assert!(matches!(
            PixelFormat::from_dataset(&dataset),
            Err(ParameterDerivationError::InvalidAttribute { tag, .. }) if tag == tags::ROWS
        ));
    }

    #[test]
    fn pixel_format_bits_stored_exceeds_allocated() {
        let dataset = monochrome().with(tags::BITS_STORED, 17u16);
        assert!(matches!(
            PixelFormat::from_dataset(&dataset),
            Err(ParameterDerivationError::InvalidAttribute { tag, .. }) if tag == tags::BITS_STORED
        ));
    }

    #[test]
    fn pixel_format_bitmap_frame_size() {
        let dataset = InMemoryDataSet::new()
            .with(tags::ROWS, 3u16)
            .with(tags::COLUMNS, 3u16)
            .with(tags::BITS_ALLOCATED, 1u16)
            .with(tags::PHOTOMETRIC_INTERPRETATION, "MONOCHROME2");
        assert_eq!(PixelFormat::from_dataset(&dataset).unwrap().frame_size(), 2);
    }
}
