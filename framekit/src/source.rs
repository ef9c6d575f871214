//! Source location parsing and resolution
//!
//! Turns a user supplied location into a string a backend can open. Local
//! files are expanded and must exist; stream URLs and camera ids pass
//! through untouched.

use crate::{VideoError, VideoResult};
use std::path::PathBuf;
use tracing::debug;

/// Kind of video source a location string refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Local file
    File,
    /// RTSP stream
    Rtsp,
    /// Plain HTTP stream
    Http,
    /// HTTPS stream
    Https,
    /// Capture device, by index or `camera…` name
    Camera,
    /// In-memory raw frames, not supported yet
    RawFrames,
    /// Unix pipe, not supported yet
    Pipe,
    /// Object storage, not supported yet
    S3,
}

impl SourceKind {
    /// Classify a location string
    pub fn detect(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();

        if lower.starts_with("rtsp://") {
            SourceKind::Rtsp
        } else if lower.starts_with("http://") {
            SourceKind::Http
        } else if lower.starts_with("https://") {
            SourceKind::Https
        } else if lower.starts_with("s3://") {
            SourceKind::S3
        } else if lower.starts_with("raw://") {
            SourceKind::RawFrames
        } else if lower.starts_with("pipe:") {
            SourceKind::Pipe
        } else if is_camera(&lower) {
            SourceKind::Camera
        } else {
            SourceKind::File
        }
    }

    /// Whether sources of this kind can be resolved
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            SourceKind::File
                | SourceKind::Rtsp
                | SourceKind::Http
                | SourceKind::Https
                | SourceKind::Camera
        )
    }

    /// Lowercase name used in errors and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Rtsp => "rtsp",
            SourceKind::Http => "http",
            SourceKind::Https => "https",
            SourceKind::Camera => "camera",
            SourceKind::RawFrames => "raw",
            SourceKind::Pipe => "pipe",
            SourceKind::S3 => "s3",
        }
    }
}

pub(crate) fn is_camera(lower: &str) -> bool {
    (!lower.is_empty() && lower.chars().all(|c| c.is_ascii_digit())) || lower.starts_with("camera")
}

/// Resolve a location into the string handed to backends
pub fn resolve_source(location: &str) -> VideoResult<String> {
    let kind = SourceKind::detect(location);
    if !kind.is_supported() {
        return Err(VideoError::UnsupportedSource {
            scheme: kind.as_str().to_string(),
        });
    }

    let resolved = match kind {
        SourceKind::File => resolve_file(location.trim())?,
        _ => location.trim().to_string(),
    };

    debug!("Resolved {} source: {}", kind.as_str(), resolved);
    Ok(resolved)
}

fn resolve_file(location: &str) -> VideoResult<String> {
    let expanded = expand_home(location);

    match expanded.canonicalize() {
        Ok(path) => Ok(path.to_string_lossy().into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(VideoError::SourceNotFound {
            path: expanded.to_string_lossy().into_owned(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn expand_home(location: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (location.strip_prefix("~"), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(location),
    }
}
