//! Decoder construction
//!
//! Concrete decode backends are provided by the embedding application
//! through a [`BackendRegistry`]; the factory composes them into the
//! decoder a [`DecoderKind`] asks for.

use crate::config::DecoderKind;
use crate::source::is_camera;
use crate::{VideoError, VideoResult};
use framekit_core::VideoDecoder;
use framekit_media::{HybridDecoder, SyntheticDecoder, SyntheticProfile};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Role a registered backend plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Cheap sequential reads, coarse seeking
    Fast,
    /// Accurate seeking and metadata
    Timeline,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Fast => f.write_str("fast"),
            BackendKind::Timeline => f.write_str("timeline"),
        }
    }
}

/// Builds a closed backend for a resolved source
pub type BackendConstructor = Arc<dyn Fn(&str) -> Box<dyn VideoDecoder> + Send + Sync>;

/// Backend constructors by role
#[derive(Clone, Default)]
pub struct BackendRegistry {
    constructors: HashMap<BackendKind, BackendConstructor>,
}

impl BackendRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for a role
    pub fn register<F>(mut self, kind: BackendKind, constructor: F) -> Self
    where
        F: Fn(&str) -> Box<dyn VideoDecoder> + Send + Sync + 'static,
    {
        self.constructors.insert(kind, Arc::new(constructor));
        self
    }

    /// Registry backed by synthetic streams, for demos and tests
    pub fn synthetic(fast: SyntheticProfile, timeline: SyntheticProfile) -> Self {
        Self::new()
            .register(BackendKind::Fast, move |_| {
                Box::new(SyntheticDecoder::new(fast.clone()))
            })
            .register(BackendKind::Timeline, move |_| {
                Box::new(SyntheticDecoder::new(timeline.clone()))
            })
    }

    /// Whether a constructor is registered for the role
    pub fn contains(&self, kind: BackendKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    /// Build a backend for the role
    pub fn build(&self, kind: BackendKind, source: &str) -> VideoResult<Box<dyn VideoDecoder>> {
        let constructor =
            self.constructors
                .get(&kind)
                .ok_or_else(|| VideoError::BackendNotRegistered {
                    backend: kind.to_string(),
                })?;
        Ok(constructor(source))
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("fast", &self.contains(BackendKind::Fast))
            .field("timeline", &self.contains(BackendKind::Timeline))
            .finish()
    }
}

/// Pick a concrete decoder kind for a source
///
/// Streams need accurate timestamps, cameras need low latency, containers
/// with unreliable indexes go to the timeline backend, anything else gets
/// the hybrid.
pub fn select_decoder_kind(source: &str) -> DecoderKind {
    let lower = source.trim().to_ascii_lowercase();

    if ["rtsp://", "http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return DecoderKind::Timeline;
    }

    if is_camera(&lower) {
        return DecoderKind::Fast;
    }

    if [".mkv", ".mov", ".ts"].iter().any(|ext| lower.ends_with(ext)) {
        return DecoderKind::Timeline;
    }

    DecoderKind::Hybrid
}

/// Builds decoders of one configured kind
#[derive(Debug, Clone)]
pub struct DecoderFactory {
    kind: DecoderKind,
    registry: BackendRegistry,
}

impl DecoderFactory {
    /// Factory for `kind` over the given backends
    pub fn new(kind: DecoderKind, registry: BackendRegistry) -> Self {
        Self { kind, registry }
    }

    /// Configured decoder kind
    pub fn kind(&self) -> DecoderKind {
        self.kind
    }

    /// Build a closed decoder for a resolved source
    pub fn create(&self, source: &str) -> VideoResult<Box<dyn VideoDecoder>> {
        if !self.kind.is_supported() {
            return Err(VideoError::UnsupportedDecoder {
                kind: self.kind.to_string(),
            });
        }

        let kind = match self.kind {
            DecoderKind::Auto => {
                let selected = select_decoder_kind(source);
                debug!("Auto-selected {} decoder for {}", selected, source);
                selected
            }
            kind => kind,
        };

        let decoder = match kind {
            DecoderKind::Fast => self.registry.build(BackendKind::Fast, source)?,
            DecoderKind::Timeline => self.registry.build(BackendKind::Timeline, source)?,
            DecoderKind::Hybrid => {
                let fast = self.registry.build(BackendKind::Fast, source)?;
                let timeline = self.registry.build(BackendKind::Timeline, source)?;
                Box::new(HybridDecoder::new(fast, timeline))
            }
            other => {
                return Err(VideoError::UnsupportedDecoder {
                    kind: other.to_string(),
                })
            }
        };

        info!("Created {} decoder for {}", decoder.name(), source);
        Ok(decoder)
    }
}
