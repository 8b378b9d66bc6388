use std::sync::{Arc, OnceLock};

use crate::codec::{CodecError, CodecUnavailableError, PixelFormat};

use super::Jpeg2000Settings;

/// A JPEG 2000 (ISO 15444-1) engine.
///
/// The wavelet transform and entropy coding are implemented outside of this crate, typically by a native library.
/// The engine receives frames that have already been validated against their [`PixelFormat`].
pub trait Jpeg2000Engine: Send + Sync + core::fmt::Debug {
    /// Encode a native frame to a JPEG 2000 codestream.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if encoding fails.
    fn encode(
        &self,
        frame: &[u8],
        format: &PixelFormat,
        settings: &Jpeg2000Settings,
    ) -> Result<Vec<u8>, CodecError>;

    /// Decode a JPEG 2000 codestream to a native frame.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if decoding fails.
    fn decode(&self, codestream: &[u8], format: &PixelFormat) -> Result<Vec<u8>, CodecError>;
}

type EngineLoader = dyn Fn() -> Result<Arc<dyn Jpeg2000Engine>, String> + Send + Sync;

/// Lazily initialises a [`Jpeg2000Engine`] and shares it between codecs.
///
/// The loader runs at most once, on the first request for the engine, even when codecs are requested concurrently.
/// Its outcome is kept for the lifetime of the backend: a failed load is not retried.
pub struct Jpeg2000Backend {
    loader: Option<Box<EngineLoader>>,
    engine: OnceLock<Result<Arc<dyn Jpeg2000Engine>, String>>,
}

impl core::fmt::Debug for Jpeg2000Backend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Jpeg2000Backend")
            .field("has_loader", &self.loader.is_some())
            .field("engine", &self.engine.get())
            .finish()
    }
}

impl Default for Jpeg2000Backend {
    fn default() -> Self {
        Self::unavailable()
    }
}

impl Jpeg2000Backend {
    /// Create a backend without an engine.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            loader: None,
            engine: OnceLock::new(),
        }
    }

    /// Create a backend that initialises its engine with `loader`.
    ///
    /// `loader` returns a description of the failure if the engine cannot be initialised on this platform.
    #[must_use]
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Jpeg2000Engine>, String> + Send + Sync + 'static,
    {
        Self {
            loader: Some(Box::new(loader)),
            engine: OnceLock::new(),
        }
    }

    /// Create a backend with an already initialised `engine`.
    #[must_use]
    pub fn with_engine(engine: Arc<dyn Jpeg2000Engine>) -> Self {
        Self::new(move || Ok(engine.clone()))
    }

    /// Returns the engine, initialising it on first use.
    ///
    /// # Errors
    /// Returns [`CodecUnavailableError`] attributed to `codec` if there is no engine or it failed to initialise.
    pub fn engine(&self, codec: &str) -> Result<Arc<dyn Jpeg2000Engine>, CodecUnavailableError> {
        let Some(loader) = &self.loader else {
            return Err(CodecUnavailableError::new(
                codec,
                "no JPEG 2000 engine is available",
            ));
        };
        self.engine
            .get_or_init(|| match loader() {
                Ok(engine) => {
                    log::info!("initialised JPEG 2000 engine {engine:?}");
                    Ok(engine)
                }
                Err(reason) => {
                    log::error!("failed to initialise JPEG 2000 engine: {reason}");
                    Err(reason)
                }
            })
            .clone()
            .map_err(|reason| CodecUnavailableError::new(codec, reason))
    }

    /// Returns true if the engine is known to be unavailable.
    ///
    /// This never initialises the engine: an engine that has not been requested yet is assumed to be available if there is a loader.
    #[must_use]
    pub fn is_known_unavailable(&self) -> bool {
        self.loader.is_none() || matches!(self.engine.get(), Some(Err(_)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug)]
    struct NullEngine;

    impl Jpeg2000Engine for NullEngine {
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

    #[test]
    fn backend_unavailable() {
        let backend = Jpeg2000Backend::unavailable();
        assert!(backend.is_known_unavailable());
        let err = backend.engine("JPEG 2000 Lossless").unwrap_err();
        assert_eq!(err.codec(), "JPEG 2000 Lossless");
    }

    #[test]
    fn backend_loads_once() {
        static LOADS: AtomicUsize = AtomicUsize::new(0);
        let backend = Arc::new(Jpeg2000Backend::new(|| {
            LOADS.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NullEngine) as Arc<dyn Jpeg2000Engine>)
        }));
        assert!(!backend.is_known_unavailable());
        assert_eq!(LOADS.load(Ordering::SeqCst), 0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = backend.clone();
                std::thread::spawn(move || backend.engine("JPEG 2000 Lossless").is_ok())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
        assert!(!backend.is_known_unavailable());
    }

    #[test]
    fn backend_load_failure_is_kept() {
        let backend = Jpeg2000Backend::new(|| Err("missing native library".to_string()));
        assert!(!backend.is_known_unavailable());
        let err = backend.engine("JPEG 2000 Lossy").unwrap_err();
        assert_eq!(err.reason(), "missing native library");
        assert!(backend.is_known_unavailable());
        assert!(backend.engine("JPEG 2000 Lossy").is_err());
    }
}
