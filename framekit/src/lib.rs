//! # framekit - Frame-accurate video access
//!
//! framekit gives callers one decoder interface over video backends that
//! each get something wrong: fast readers with coarse seeking and
//! unreliable position reports, accurate readers that are too slow for
//! bulk decoding.
//!
//! ## Key Features
//!
//! - **Hybrid decoding**: bulk reads from the fast backend, seeking and
//!   metadata from the timeline backend, with a trusted position report
//! - **Latest-wins background reading**: a worker thread publishes only the
//!   newest frame, with a bounded shutdown
//! - **Frame history**: fixed-capacity ring buffer of recent frames
//! - **Pluggable backends**: native bindings register through a
//!   [`BackendRegistry`]; a deterministic synthetic backend ships built in
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use framekit::{BackendRegistry, DecoderKind, SyntheticProfile, VideoCore, VideoCoreConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = BackendRegistry::synthetic(
//!         SyntheticProfile::fast(250, 25.0),
//!         SyntheticProfile::timeline(250, 25.0),
//!     );
//!     let config = VideoCoreConfig::default()
//!         .with_decoder(DecoderKind::Hybrid)
//!         .with_buffer_size(16);
//!
//!     let mut core = VideoCore::new("rtsp://camera.local/live", config, registry)?;
//!     core.open()?;
//!
//!     core.go_to_frame(120);
//!     if let Some(frame) = core.get_frame() {
//!         println!("frame {} at {} ms", frame.index, frame.timestamp);
//!     }
//!     println!("decoder position: {}", core.get_decoder_frame_id());
//!
//!     core.close();
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use framekit_core::{
    clamp_frame_index, ErrorCategory, RingBuffer, VideoDecoder, VideoError, VideoFrame,
    VideoMetadata, VideoResult,
};

pub use framekit_media::{
    shared_decoder, AsyncFrameReader, HybridDecoder, SeekAuthority, SeekMode, SharedDecoder,
    SyntheticDecoder, SyntheticFaults, SyntheticProbe, SyntheticProfile, SyntheticStats,
};

// Public API modules
pub mod config;
pub mod factory;
pub mod logging;
pub mod source;
pub mod video_core;

// Re-export main API types
pub use config::{DecoderKind, VideoCoreConfig};
pub use factory::{select_decoder_kind, BackendKind, BackendRegistry, DecoderFactory};
pub use logging::init_logging;
pub use source::{resolve_source, SourceKind};
pub use video_core::VideoCore;
