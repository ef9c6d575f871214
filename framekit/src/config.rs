//! Configuration types and defaults

use crate::{VideoError, VideoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Which decoder the orchestrator builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// Pick from the source string
    Auto,
    /// Fast sequential backend only
    #[default]
    Fast,
    /// Timeline-accurate backend only
    Timeline,
    /// Fast backend for frames, timeline backend for seeking and metadata
    Hybrid,
    /// Reserved, not available in this build
    Ffmpeg,
    /// Reserved, not available in this build
    Gstreamer,
}

impl DecoderKind {
    /// Lowercase name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            DecoderKind::Auto => "auto",
            DecoderKind::Fast => "fast",
            DecoderKind::Timeline => "timeline",
            DecoderKind::Hybrid => "hybrid",
            DecoderKind::Ffmpeg => "ffmpeg",
            DecoderKind::Gstreamer => "gstreamer",
        }
    }

    /// Whether the factory can build this kind
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            DecoderKind::Auto | DecoderKind::Fast | DecoderKind::Timeline | DecoderKind::Hybrid
        )
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecoderKind {
    type Err = VideoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(DecoderKind::Auto),
            "fast" => Ok(DecoderKind::Fast),
            "timeline" => Ok(DecoderKind::Timeline),
            "hybrid" => Ok(DecoderKind::Hybrid),
            "ffmpeg" => Ok(DecoderKind::Ffmpeg),
            "gstreamer" => Ok(DecoderKind::Gstreamer),
            _ => Err(VideoError::UnknownDecoder {
                name: s.to_string(),
            }),
        }
    }
}

/// Video core configuration
///
/// Lightweight and file-agnostic; any layer may build one directly or load
/// it from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoCoreConfig {
    /// Decoder to build
    pub decoder: DecoderKind,
    /// Frame history capacity; 0 disables the history
    pub buffer_size: usize,
    /// Wrap the decoder in a background reader
    pub async_enabled: bool,
    /// Delay between background reads, in seconds
    pub poll_delay_secs: f64,
    /// Bound on waiting for the background reader to stop, in milliseconds
    pub stop_timeout_ms: u64,
}

impl Default for VideoCoreConfig {
    fn default() -> Self {
        Self {
            decoder: DecoderKind::Fast,
            buffer_size: 0,
            async_enabled: false,
            poll_delay_secs: 0.0,
            stop_timeout_ms: 1000,
        }
    }
}

impl VideoCoreConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> VideoResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> VideoResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Validate configuration
    pub fn validate(&self) -> VideoResult<()> {
        if !self.poll_delay_secs.is_finite() || self.poll_delay_secs < 0.0 {
            return Err(VideoError::InvalidConfiguration {
                message: format!("poll_delay_secs must be >= 0, got {}", self.poll_delay_secs),
            });
        }

        if self.stop_timeout_ms == 0 {
            return Err(VideoError::InvalidConfiguration {
                message: "stop_timeout_ms must be > 0".to_string(),
            });
        }

        Ok(())
    }

    /// Set the decoder kind
    pub fn with_decoder(mut self, decoder: DecoderKind) -> Self {
        self.decoder = decoder;
        self
    }

    /// Enable the frame history with the given capacity
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Enable the background reader
    pub fn with_async(mut self, poll_delay: Duration) -> Self {
        self.async_enabled = true;
        self.poll_delay_secs = poll_delay.as_secs_f64();
        self
    }

    /// Delay between background reads
    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs_f64(self.poll_delay_secs.max(0.0))
    }

    /// Bound on the background reader's shutdown
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}
