//! The JPEG 2000 codecs.
//!
//! Two factories serve the JPEG 2000 transfer syntaxes:
//!  - [`Jpeg2000LosslessCodecFactory`]: JPEG 2000 Image Compression (Lossless Only), `1.2.840.10008.1.2.4.90`.
//!  - [`Jpeg2000LossyCodecFactory`]: JPEG 2000 Image Compression, `1.2.840.10008.1.2.4.91`.
//!
//! Both produce a [`Jpeg2000Codec`] over a shared [`Jpeg2000Engine`] initialised once by a [`Jpeg2000Backend`].
//!
//! ### Parameters document
//! Lossless:
//! ```json
//! {
//!     "name": "jpeg2000_lossless",
//!     "configuration": {
//!         "rate_levels": [80, 40, 20],
//!         "allow_mct": true
//!     }
//! }
//! ```
//! Lossy:
//! ```json
//! {
//!     "name": "jpeg2000_lossy",
//!     "configuration": {
//!         "ratio": 15.0,
//!         "update_photometric_interpretation": false
//!     }
//! }
//! ```
//! Absent configuration fields take their value from the [`CodecConfig`](crate::config::CodecConfig).

mod jpeg2000_codec;
mod jpeg2000_configuration;
mod jpeg2000_engine;
mod jpeg2000_factory;
mod jpeg2000_settings;

pub use jpeg2000_codec::{Jpeg2000Codec, LOSSY_COMPRESSION_METHOD};
pub use jpeg2000_configuration::{
    Jpeg2000LosslessConfiguration, Jpeg2000LosslessConfigurationV1, Jpeg2000LossyConfiguration,
    Jpeg2000LossyConfigurationV1,
};
pub use jpeg2000_engine::{Jpeg2000Backend, Jpeg2000Engine};
pub use jpeg2000_factory::{
    Jpeg2000LosslessCodecFactory, Jpeg2000LossyCodecFactory, LOSSLESS_IDENTIFIER, LOSSLESS_NAME,
    LOSSY_IDENTIFIER, LOSSY_NAME,
};
pub use jpeg2000_settings::Jpeg2000Settings;
