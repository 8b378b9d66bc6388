//! Read-only dataset access.
//!
//! Codec factories inspect a dataset through the [`DataSet`] trait to derive codec parameters.
//! The storage model of the dataset belongs to the caller; [`InMemoryDataSet`] is a minimal implementation.

use std::collections::BTreeMap;

use derive_more::{Display, From};

/// A DICOM attribute tag (group, element).
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("({_0:04X},{_1:04X})")]
pub struct Tag(pub u16, pub u16);

/// Tags of the attributes consulted during codec negotiation.
pub mod tags {
    use super::Tag;

    /// Transfer Syntax UID.
    pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
    /// Samples per Pixel.
    pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
    /// Photometric Interpretation.
    pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
    /// Planar Configuration.
    pub const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
    /// Rows.
    pub const ROWS: Tag = Tag(0x0028, 0x0010);
    /// Columns.
    pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
    /// Bits Allocated.
    pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
    /// Bits Stored.
    pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
    /// High Bit.
    pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
    /// Pixel Representation.
    pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
    /// Lossy Image Compression.
    pub const LOSSY_IMAGE_COMPRESSION: Tag = Tag(0x0028, 0x2110);
    /// Lossy Image Compression Ratio.
    pub const LOSSY_IMAGE_COMPRESSION_RATIO: Tag = Tag(0x0028, 0x2112);
    /// Lossy Image Compression Method.
    pub const LOSSY_IMAGE_COMPRESSION_METHOD: Tag = Tag(0x0028, 0x2114);

    /// Returns the keyword of a tag in this module, or [`None`].
    #[must_use]
    pub fn keyword(tag: Tag) -> Option<&'static str> {
        Some(match tag {
            TRANSFER_SYNTAX_UID => "TransferSyntaxUID",
            SAMPLES_PER_PIXEL => "SamplesPerPixel",
            PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
            PLANAR_CONFIGURATION => "PlanarConfiguration",
            ROWS => "Rows",
            COLUMNS => "Columns",
            BITS_ALLOCATED => "BitsAllocated",
            BITS_STORED => "BitsStored",
            HIGH_BIT => "HighBit",
            PIXEL_REPRESENTATION => "PixelRepresentation",
            LOSSY_IMAGE_COMPRESSION => "LossyImageCompression",
            LOSSY_IMAGE_COMPRESSION_RATIO => "LossyImageCompressionRatio",
            LOSSY_IMAGE_COMPRESSION_METHOD => "LossyImageCompressionMethod",
            _ => return None,
        })
    }
}

/// An attribute value.
///
/// Multi-valued attributes keep their values in order.
#[derive(Clone, Debug, PartialEq, From)]
pub enum AttributeValue {
    /// Text values (`CS`, `UI`, `DS`, `IS`, ...).
    Strings(Vec<String>),
    /// Unsigned integer values (`US`, `UL`).
    Unsigned(Vec<u32>),
    /// Signed integer values (`SS`, `SL`).
    Signed(Vec<i32>),
    /// Floating point values (`FL`, `FD`).
    Floats(Vec<f64>),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Strings(vec![value.to_string()])
    }
}

impl From<u16> for AttributeValue {
    fn from(value: u16) -> Self {
        Self::Unsigned(vec![u32::from(value)])
    }
}

impl AttributeValue {
    /// Returns the first value as an unsigned integer.
    ///
    /// Text values are parsed as integer strings.
    #[must_use]
    pub fn first_u32(&self) -> Option<u32> {
        match self {
            Self::Unsigned(values) => values.first().copied(),
            Self::Signed(values) => values.first().and_then(|v| u32::try_from(*v).ok()),
            Self::Strings(values) => values.first().and_then(|v| v.trim().parse().ok()),
            Self::Floats(_) => None,
        }
    }

    /// Returns the first value as a floating point number.
    ///
    /// Text values are parsed as decimal strings.
    #[must_use]
    pub fn first_f64(&self) -> Option<f64> {
        match self {
            Self::Unsigned(values) => values.first().map(|v| f64::from(*v)),
            Self::Signed(values) => values.first().map(|v| f64::from(*v)),
            Self::Floats(values) => values.first().copied(),
            Self::Strings(values) => values.first().and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Returns the first text value with padding removed.
    #[must_use]
    pub fn first_str(&self) -> Option<&str> {
        match self {
            Self::Strings(values) => values
                .first()
                .map(|v| v.trim_matches(|c: char| c == ' ' || c == '\0')),
            _ => None,
        }
    }

    /// Returns a human-readable rendering of the value.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        fn join<T: ToString>(values: &[T]) -> String {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\\")
        }
        match self {
            Self::Strings(values) => values.join("\\"),
            Self::Unsigned(values) => join(values),
            Self::Signed(values) => join(values),
            Self::Floats(values) => join(values),
        }
    }
}

/// Read-only access to the attributes of a dataset.
pub trait DataSet {
    /// Returns the value of the attribute with `tag`, or [`None`] if it is absent or empty.
    fn attribute(&self, tag: Tag) -> Option<&AttributeValue>;

    /// Returns true if the attribute with `tag` is present.
    fn contains(&self, tag: Tag) -> bool {
        self.attribute(tag).is_some()
    }

    /// Returns the first value of the attribute with `tag` as a `u16`.
    ///
    /// Returns [`None`] if the attribute is absent or its value is not representable as a `u16`.
    fn get_u16(&self, tag: Tag) -> Option<u16> {
        self.attribute(tag)
            .and_then(AttributeValue::first_u32)
            .and_then(|v| u16::try_from(v).ok())
    }

    /// Returns the first value of the attribute with `tag` as an `f64`.
    fn get_f64(&self, tag: Tag) -> Option<f64> {
        self.attribute(tag).and_then(AttributeValue::first_f64)
    }

    /// Returns the first text value of the attribute with `tag`.
    fn get_str(&self, tag: Tag) -> Option<&str> {
        self.attribute(tag).and_then(AttributeValue::first_str)
    }
}

/// A dataset held in memory, ordered by tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InMemoryDataSet {
    attributes: BTreeMap<Tag, AttributeValue>,
}

impl InMemoryDataSet {
    /// Create an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of an attribute, returning the previous value.
    pub fn put(&mut self, tag: Tag, value: impl Into<AttributeValue>) -> Option<AttributeValue> {
        self.attributes.insert(tag, value.into())
    }

    /// Set the value of an attribute and return the dataset.
    #[must_use]
    pub fn with(mut self, tag: Tag, value: impl Into<AttributeValue>) -> Self {
        self.put(tag, value);
        self
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, tag: Tag) -> Option<AttributeValue> {
        self.attributes.remove(&tag)
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the dataset has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over the attributes in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &AttributeValue)> {
        self.attributes.iter()
    }
}

impl DataSet for InMemoryDataSet {
    fn attribute(&self, tag: Tag) -> Option<&AttributeValue> {
        self.attributes.get(&tag).filter(|value| match value {
            AttributeValue::Strings(v) => !v.is_empty(),
            AttributeValue::Unsigned(v) => !v.is_empty(),
            AttributeValue::Signed(v) => !v.is_empty(),
            AttributeValue::Floats(v) => !v.is_empty(),
        })
    }
}

impl FromIterator<(Tag, AttributeValue)> for InMemoryDataSet {
    fn from_iter<T: IntoIterator<Item = (Tag, AttributeValue)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_typed_access() {
        let dataset = InMemoryDataSet::new()
            .with(tags::BITS_ALLOCATED, 16u16)
            .with(tags::PHOTOMETRIC_INTERPRETATION, "MONOCHROME2 ")
            .with(tags::ROWS, AttributeValue::Strings(vec!["512".into()]));
        assert_eq!(dataset.get_u16(tags::BITS_ALLOCATED), Some(16));
        assert_eq!(dataset.get_u16(tags::ROWS), Some(512));
        assert_eq!(
            dataset.get_str(tags::PHOTOMETRIC_INTERPRETATION),
            Some("MONOCHROME2")
        );
        assert!(!dataset.contains(tags::COLUMNS));
    }

    #[test]
    fn dataset_multi_valued_ratio() {
        let dataset = InMemoryDataSet::new().with(
            tags::LOSSY_IMAGE_COMPRESSION_RATIO,
            AttributeValue::Strings(vec!["12.5".into(), "8".into()]),
        );
        assert_eq!(
            dataset.get_f64(tags::LOSSY_IMAGE_COMPRESSION_RATIO),
            Some(12.5)
        );
    }

    #[test]
    fn dataset_empty_attribute_is_absent() {
        let dataset = InMemoryDataSet::new().with(tags::BITS_ALLOCATED, Vec::<u32>::new());
        assert!(!dataset.contains(tags::BITS_ALLOCATED));
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn dataset_u16_out_of_range() {
        let dataset =
            InMemoryDataSet::new().with(tags::ROWS, AttributeValue::Unsigned(vec![70_000]));
        assert_eq!(dataset.get_u16(tags::ROWS), None);
    }

    #[test]
    fn tag_display() {
        assert_eq!(tags::BITS_ALLOCATED.to_string(), "(0028,0100)");
        assert_eq!(tags::keyword(tags::ROWS), Some("Rows"));
        assert_eq!(tags::keyword(Tag(0x7FE0, 0x0010)), None);
    }
}
