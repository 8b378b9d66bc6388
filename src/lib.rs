//! A transfer syntax aware codec registry for DICOM pixel data.
//!
//! Compressed DICOM pixel data is identified by its transfer syntax UID.
//! This crate maps transfer syntaxes to the codec factories that serve them, decides which factory is usable, and negotiates codec parameters from a dataset or a parameters document.
//!
//! ## Overview
//!  - [`transfer_syntax`]: the table of known [`TransferSyntax`](transfer_syntax::TransferSyntax)es.
//!  - [`factory`]: the [`CodecFactory`](factory::CodecFactory) trait. A factory serves one transfer syntax, reports whether it is enabled, derives [`CodecParameters`](codec::CodecParameters), and creates codecs.
//!  - [`codec`]: the [`DicomCodec`](codec::DicomCodec) trait and the JPEG 2000 lossless and lossy codecs.
//!  - [`registry`]: the [`CodecRegistry`](registry::CodecRegistry), which resolves a transfer syntax UID to an enabled factory.
//!  - [`host`]: the [`RegistryHost`](host::RegistryHost), which discovers the factory plugins compiled into the binary and builds a registry.
//!  - [`config`]: administrative switches and parameter defaults shared with every factory.
//!  - [`dataset`] and [`document`]: the inputs of parameter derivation.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! # use dicom_codec_registry::{
//! #     codec::{CodecError, Jpeg2000Engine, Jpeg2000Settings, PixelFormat},
//! #     config::SharedCodecConfig,
//! #     dataset::{tags, InMemoryDataSet},
//! #     host::RegistryHost,
//! #     registry::RegistryError,
//! #     transfer_syntax::uids,
//! # };
//! # #[derive(Debug)]
//! # struct MyEngine;
//! # impl Jpeg2000Engine for MyEngine {
//! #     fn encode(&self, frame: &[u8], _: &PixelFormat, _: &Jpeg2000Settings) -> Result<Vec<u8>, CodecError> {
//! #         Ok(frame[..frame.len() / 4].to_vec())
//! #     }
//! #     fn decode(&self, codestream: &[u8], _: &PixelFormat) -> Result<Vec<u8>, CodecError> {
//! #         Ok(codestream.repeat(4))
//! #     }
//! # }
//! let config = SharedCodecConfig::default();
//! config.write().set_lossy_encoding_enabled(false);
//! let registry = RegistryHost::new(config.clone())
//!     .with_jpeg2000_engine(Arc::new(MyEngine))
//!     .build_registry()?;
//!
//! let dataset = InMemoryDataSet::new()
//!     .with(tags::ROWS, 16u16)
//!     .with(tags::COLUMNS, 16u16)
//!     .with(tags::BITS_ALLOCATED, 16u16)
//!     .with(tags::PHOTOMETRIC_INTERPRETATION, "MONOCHROME2");
//!
//! let factory = registry.resolve(uids::JPEG_2000_LOSSLESS)?;
//! let parameters = factory.codec_parameters_from_dataset(&dataset)?;
//! let codec = factory.dicom_codec()?;
//! let format = PixelFormat::from_dataset(&dataset)?;
//! let encoded = codec.encode(&vec![0u8; 512], &format, &parameters)?;
//! assert_eq!(encoded.data().len(), 128);
//!
//! // Lossy encoding is switched off
//! assert!(matches!(
//!     registry.resolve(uids::JPEG_2000),
//!     Err(RegistryError::NoEnabledCodec { .. })
//! ));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Logging
//! This crate logs through the [`log`] facade: registration and parameter derivation at `debug`, engine initialisation at `info` and `error`, and conflicting enabled factories or a retired transfer syntax at `warn`.
//!
//! ## Licence
//! `dicom_codec_registry` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
// #![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod codec;
pub mod config;
pub mod dataset;
pub mod document;
pub mod factory;
pub mod host;
pub mod plugin;
pub mod registry;
pub mod transfer_syntax;
