//! DICOM transfer syntaxes.
//!
//! A [`TransferSyntax`] names how the pixel data of a dataset is encoded.
//! The set of known transfer syntaxes is fixed: it is built once on first use and never mutated.
//! Each known transfer syntax is a static (e.g. [`JPEG_2000_LOSSLESS`]); look one up by UID with [`TransferSyntax::from_uid`] or iterate them all with [`TransferSyntax::all`].
//!
//! See <https://dicom.nema.org/medical/dicom/current/output/chtml/part05/chapter_10.html>.

use std::{collections::HashMap, sync::OnceLock};

use derive_more::Display;

/// Transfer syntax UIDs.
pub mod uids {
    /// Unique identifier for Implicit VR Little Endian.
    pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";

    /// Unique identifier for Explicit VR Little Endian.
    pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

    /// Unique identifier for Deflated Explicit VR Little Endian.
    pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";

    /// Unique identifier for Explicit VR Big Endian (retired).
    pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

    /// Unique identifier for RLE Lossless.
    pub const RLE_LOSSLESS: &str = "1.2.840.10008.1.2.5";

    /// Unique identifier for JPEG Baseline (Process 1).
    pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";

    /// Unique identifier for JPEG Extended (Process 2 & 4).
    pub const JPEG_EXTENDED: &str = "1.2.840.10008.1.2.4.51";

    /// Unique identifier for JPEG Lossless, Non-Hierarchical (Process 14).
    pub const JPEG_LOSSLESS: &str = "1.2.840.10008.1.2.4.57";

    /// Unique identifier for JPEG Lossless, Non-Hierarchical, First-Order Prediction (Process 14, Selection Value 1).
    pub const JPEG_LOSSLESS_SV1: &str = "1.2.840.10008.1.2.4.70";

    /// Unique identifier for JPEG-LS Lossless.
    pub const JPEG_LS_LOSSLESS: &str = "1.2.840.10008.1.2.4.80";

    /// Unique identifier for JPEG-LS Lossy (Near-Lossless).
    pub const JPEG_LS_NEAR_LOSSLESS: &str = "1.2.840.10008.1.2.4.81";

    /// Unique identifier for JPEG 2000 Image Compression (Lossless Only).
    pub const JPEG_2000_LOSSLESS: &str = "1.2.840.10008.1.2.4.90";

    /// Unique identifier for JPEG 2000 Image Compression.
    pub const JPEG_2000: &str = "1.2.840.10008.1.2.4.91";
}

/// The family of compression algorithms a transfer syntax belongs to.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodecFamily {
    /// Native (uncompressed) pixel data.
    #[display("uncompressed")]
    Uncompressed,
    /// Deflate applied to the whole dataset.
    #[display("deflate")]
    Deflate,
    /// Run length encoding.
    #[display("rle")]
    Rle,
    /// ISO 10918-1 JPEG.
    #[display("jpeg")]
    Jpeg,
    /// ISO 14495-1 JPEG-LS.
    #[display("jpeg-ls")]
    JpegLs,
    /// ISO 15444-1 JPEG 2000.
    #[display("jpeg2000")]
    Jpeg2000,
}

/// A transfer syntax.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display("{name} ({uid})")]
pub struct TransferSyntax {
    uid: &'static str,
    name: &'static str,
    family: CodecFamily,
    lossy: bool,
    retired: bool,
    encapsulated: bool,
    big_endian: bool,
}

impl TransferSyntax {
    const fn native(
        uid: &'static str,
        name: &'static str,
        big_endian: bool,
        retired: bool,
    ) -> Self {
        Self {
            uid,
            name,
            family: CodecFamily::Uncompressed,
            lossy: false,
            retired,
            encapsulated: false,
            big_endian,
        }
    }

    const fn encapsulated(
        uid: &'static str,
        name: &'static str,
        family: CodecFamily,
        lossy: bool,
    ) -> Self {
        Self {
            uid,
            name,
            family,
            lossy,
            retired: false,
            encapsulated: true,
            big_endian: false,
        }
    }

    /// Look up a transfer syntax by its UID.
    ///
    /// Trailing `UI` value padding (NUL or space) is ignored.
    /// Returns [`None`] if the UID is not a known transfer syntax.
    #[must_use]
    pub fn from_uid(uid: &str) -> Option<&'static Self> {
        table().get(normalise_uid(uid)).copied()
    }

    /// Returns all known transfer syntaxes.
    #[must_use]
    pub fn all() -> &'static [&'static TransferSyntax] {
        TRANSFER_SYNTAXES
    }

    /// Returns the UID.
    #[must_use]
    pub const fn uid(&self) -> &'static str {
        self.uid
    }

    /// Returns the human-readable name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the codec family.
    #[must_use]
    pub const fn family(&self) -> CodecFamily {
        self.family
    }

    /// Returns true if pixel data encoded with this transfer syntax may have lost information.
    #[must_use]
    pub const fn is_lossy(&self) -> bool {
        self.lossy
    }

    /// Returns true if the transfer syntax has been retired from the standard.
    #[must_use]
    pub const fn is_retired(&self) -> bool {
        self.retired
    }

    /// Returns true if pixel data is stored as encapsulated fragments.
    #[must_use]
    pub const fn is_encapsulated(&self) -> bool {
        self.encapsulated
    }

    /// Returns true if the transfer syntax uses big endian byte ordering.
    #[must_use]
    pub const fn is_big_endian(&self) -> bool {
        self.big_endian
    }
}

/// Strip the padding permitted at the end of a `UI` value.
pub(crate) fn normalise_uid(uid: &str) -> &str {
    uid.trim_end_matches(['\0', ' '])
}

macro_rules! transfer_syntaxes {
    ($($(#[$doc:meta])* $ident:ident = $value:expr;)*) => {
        $(
            $(#[$doc])*
            pub static $ident: TransferSyntax = $value;
        )*

        static TRANSFER_SYNTAXES: &[&TransferSyntax] = &[$(&$ident),*];
    };
}

transfer_syntaxes! {
    /// Implicit VR Little Endian.
    IMPLICIT_VR_LITTLE_ENDIAN = TransferSyntax::native(uids::IMPLICIT_VR_LITTLE_ENDIAN, "Implicit VR Little Endian", false, false);
    /// Explicit VR Little Endian.
    EXPLICIT_VR_LITTLE_ENDIAN = TransferSyntax::native(uids::EXPLICIT_VR_LITTLE_ENDIAN, "Explicit VR Little Endian", false, false);
    /// Deflated Explicit VR Little Endian.
    DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN = TransferSyntax {
        uid: uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
        name: "Deflated Explicit VR Little Endian",
        family: CodecFamily::Deflate,
        lossy: false,
        retired: false,
        encapsulated: false,
        big_endian: false,
    };
    /// Explicit VR Big Endian (retired).
    EXPLICIT_VR_BIG_ENDIAN = TransferSyntax::native(uids::EXPLICIT_VR_BIG_ENDIAN, "Explicit VR Big Endian", true, true);
    /// JPEG Baseline (Process 1).
    JPEG_BASELINE = TransferSyntax::encapsulated(uids::JPEG_BASELINE, "JPEG Baseline (Process 1)", CodecFamily::Jpeg, true);
    /// JPEG Extended (Process 2 & 4).
    JPEG_EXTENDED = TransferSyntax::encapsulated(uids::JPEG_EXTENDED, "JPEG Extended (Process 2 & 4)", CodecFamily::Jpeg, true);
    /// JPEG Lossless, Non-Hierarchical (Process 14).
    JPEG_LOSSLESS = TransferSyntax::encapsulated(uids::JPEG_LOSSLESS, "JPEG Lossless, Non-Hierarchical (Process 14)", CodecFamily::Jpeg, false);
    /// JPEG Lossless, Non-Hierarchical, First-Order Prediction.
    JPEG_LOSSLESS_SV1 = TransferSyntax::encapsulated(uids::JPEG_LOSSLESS_SV1, "JPEG Lossless, Non-Hierarchical, First-Order Prediction", CodecFamily::Jpeg, false);
    /// JPEG-LS Lossless.
    JPEG_LS_LOSSLESS = TransferSyntax::encapsulated(uids::JPEG_LS_LOSSLESS, "JPEG-LS Lossless Image Compression", CodecFamily::JpegLs, false);
    /// JPEG-LS Lossy (Near-Lossless).
    JPEG_LS_NEAR_LOSSLESS = TransferSyntax::encapsulated(uids::JPEG_LS_NEAR_LOSSLESS, "JPEG-LS Lossy (Near-Lossless) Image Compression", CodecFamily::JpegLs, true);
    /// JPEG 2000 Image Compression (Lossless Only).
    JPEG_2000_LOSSLESS = TransferSyntax::encapsulated(uids::JPEG_2000_LOSSLESS, "JPEG 2000 Image Compression (Lossless Only)", CodecFamily::Jpeg2000, false);
    /// JPEG 2000 Image Compression.
    JPEG_2000 = TransferSyntax::encapsulated(uids::JPEG_2000, "JPEG 2000 Image Compression", CodecFamily::Jpeg2000, true);
    /// RLE Lossless.
    RLE_LOSSLESS = TransferSyntax::encapsulated(uids::RLE_LOSSLESS, "RLE Lossless", CodecFamily::Rle, false);
}

fn table() -> &'static HashMap<&'static str, &'static TransferSyntax> {
    static TABLE: OnceLock<HashMap<&'static str, &'static TransferSyntax>> = OnceLock::new();
    TABLE.get_or_init(|| {
        TRANSFER_SYNTAXES
            .iter()
            .map(|transfer_syntax| (transfer_syntax.uid, *transfer_syntax))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_syntax_lookup() {
        let ts = TransferSyntax::from_uid(uids::JPEG_2000_LOSSLESS).unwrap();
        assert_eq!(ts.family(), CodecFamily::Jpeg2000);
        assert!(!ts.is_lossy());
        assert!(ts.is_encapsulated());

        let ts = TransferSyntax::from_uid(uids::JPEG_2000).unwrap();
        assert!(ts.is_lossy());
        assert_eq!(
            ts.to_string(),
            "JPEG 2000 Image Compression (1.2.840.10008.1.2.4.91)"
        );
    }

    #[test]
    fn transfer_syntax_lookup_padded() {
        assert_eq!(
            TransferSyntax::from_uid("1.2.840.10008.1.2.4.90\0")
                .map(TransferSyntax::uid),
            Some(uids::JPEG_2000_LOSSLESS)
        );
        assert!(TransferSyntax::from_uid("1.2.840.10008.1.2 ").is_some());
    }

    #[test]
    fn transfer_syntax_statics_are_table_entries() {
        assert!(std::ptr::eq(
            TransferSyntax::from_uid(uids::JPEG_2000_LOSSLESS).unwrap(),
            &JPEG_2000_LOSSLESS
        ));
        assert_eq!(JPEG_2000.uid(), uids::JPEG_2000);
    }

    #[test]
    fn transfer_syntax_unknown() {
        assert!(TransferSyntax::from_uid("1.2.840.10008.1.2.4.99").is_none());
        assert!(TransferSyntax::from_uid("").is_none());
    }

    #[test]
    fn transfer_syntax_table_unique() {
        assert_eq!(table().len(), TransferSyntax::all().len());
        let retired: Vec<_> = TransferSyntax::all()
            .iter()
            .filter(|ts| ts.is_retired())
            .map(|ts| ts.uid())
            .collect();
        assert_eq!(retired, vec![uids::EXPLICIT_VR_BIG_ENDIAN]);
    }
}
