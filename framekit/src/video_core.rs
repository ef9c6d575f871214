//! Orchestrator over one decoder, an optional frame history and an optional
//! background reader

use crate::config::VideoCoreConfig;
use crate::factory::{BackendRegistry, DecoderFactory};
use crate::source::resolve_source;
use crate::{VideoError, VideoResult};
use framekit_core::{RingBuffer, VideoDecoder, VideoFrame, VideoMetadata};
use framekit_media::{AsyncFrameReader, SharedDecoder};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bound on acquiring the decoder during `close`
const CLOSE_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Bound on acquiring the decoder for a position query
const QUERY_LOCK_TIMEOUT: Duration = Duration::from_millis(50);

/// Single entry point for opening, navigating and reading a video
///
/// The decoder is the source of truth for the position; the frame history
/// and the background reader only observe what it produces.
///
/// Metadata is captured at `open`, and position queries wait on the
/// decoder for a bounded time only, so neither stalls behind a read in
/// flight on the background reader.
pub struct VideoCore {
    config: VideoCoreConfig,
    source_uri: String,
    decoder: SharedDecoder,
    metadata: VideoMetadata,
    /// Last position read from the decoder
    last_frame_id: AtomicI64,
    buffer: Option<RingBuffer<VideoFrame>>,
    async_reader: Option<AsyncFrameReader>,
}

impl VideoCore {
    /// Resolve `location` and build the configured decoder for it
    pub fn new(
        location: &str,
        config: VideoCoreConfig,
        registry: BackendRegistry,
    ) -> VideoResult<Self> {
        config.validate()?;
        let source_uri = resolve_source(location)?;
        let decoder = DecoderFactory::new(config.decoder, registry).create(&source_uri)?;
        Self::assemble(source_uri, decoder, config)
    }

    /// Wrap an already constructed decoder for `source_uri`
    pub fn with_decoder(
        source_uri: impl Into<String>,
        decoder: Box<dyn VideoDecoder>,
        config: VideoCoreConfig,
    ) -> VideoResult<Self> {
        config.validate()?;
        Self::assemble(source_uri.into(), decoder, config)
    }

    fn assemble(
        source_uri: String,
        decoder: Box<dyn VideoDecoder>,
        config: VideoCoreConfig,
    ) -> VideoResult<Self> {
        let decoder: SharedDecoder = Arc::new(Mutex::new(decoder));

        let buffer = if config.buffer_size > 0 {
            Some(RingBuffer::new(config.buffer_size)?)
        } else {
            None
        };

        let async_reader = config.async_enabled.then(|| {
            AsyncFrameReader::with_poll_delay(Arc::clone(&decoder), config.poll_delay())
                .with_stop_timeout(config.stop_timeout())
        });

        debug!(
            "VideoCore assembled for {} (buffer: {}, async: {})",
            source_uri, config.buffer_size, config.async_enabled
        );

        Ok(Self {
            config,
            source_uri,
            decoder,
            metadata: VideoMetadata::default(),
            last_frame_id: AtomicI64::new(0),
            buffer,
            async_reader,
        })
    }

    /// Source the decoder was built for
    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    /// Active configuration
    pub fn config(&self) -> &VideoCoreConfig {
        &self.config
    }

    /// Open the decoder
    ///
    /// Fails only when no backend could open the source.
    pub fn open(&mut self) -> VideoResult<()> {
        let mut decoder = self.decoder.lock();
        if !decoder.open() {
            return Err(VideoError::OpenFailed {
                source_uri: self.source_uri.clone(),
                reason: format!("{} decoder could not open the source", decoder.name()),
            });
        }

        self.metadata = VideoMetadata {
            fps: decoder.fps(),
            total_frames: decoder.total_frames(),
        };
        self.last_frame_id.store(decoder.cur_frame_id(), Ordering::Relaxed);
        drop(decoder);

        info!("VideoCore opened {}", self.source_uri);
        Ok(())
    }

    /// Stop the background reader, then close the decoder
    ///
    /// Neither step can block indefinitely: the reader join and the decoder
    /// lock are both bounded.
    pub fn close(&mut self) {
        if let Some(reader) = self.async_reader.as_mut() {
            reader.stop();
        }

        self.metadata = VideoMetadata::default();
        self.last_frame_id.store(0, Ordering::Relaxed);

        let Some(mut decoder) = self.decoder.try_lock_for(CLOSE_LOCK_TIMEOUT) else {
            warn!(
                "VideoCore: decoder for {} still busy after {:?}; skipping close",
                self.source_uri, CLOSE_LOCK_TIMEOUT
            );
            return;
        };

        if !decoder.is_open() {
            return;
        }

        if panic::catch_unwind(AssertUnwindSafe(|| decoder.close())).is_err() {
            warn!("VideoCore: decoder panicked while closing {}", self.source_uri);
        }
        info!("VideoCore closed {}", self.source_uri);
    }

    /// Frame rate and frame count the decoder reported at open
    ///
    /// Both are unknown before a successful `open` and after `close`.
    pub fn get_metadata(&self) -> VideoMetadata {
        self.metadata
    }

    /// Seek the decoder
    pub fn go_to_frame(&mut self, frame_index: i64) -> bool {
        let mut decoder = self.decoder.lock();
        let ok = decoder.seek(frame_index);
        self.last_frame_id.store(decoder.cur_frame_id(), Ordering::Relaxed);
        ok
    }

    /// Position as the decoder reports it
    ///
    /// While the background reader holds the decoder for longer than a
    /// short bound, answers the last position observed instead.
    pub fn get_decoder_frame_id(&self) -> i64 {
        match self.decoder.try_lock_for(QUERY_LOCK_TIMEOUT) {
            Some(decoder) => {
                let position = decoder.cur_frame_id();
                self.last_frame_id.store(position, Ordering::Relaxed);
                position
            }
            None => {
                let position = self.last_frame_id.load(Ordering::Relaxed);
                debug!(
                    "VideoCore: decoder busy, reporting last known position {}",
                    position
                );
                position
            }
        }
    }

    /// Read one frame, recording it in the history when enabled
    pub fn get_frame(&mut self) -> Option<VideoFrame> {
        let frame = {
            let mut decoder = self.decoder.lock();
            let frame = decoder.read();
            self.last_frame_id.store(decoder.cur_frame_id(), Ordering::Relaxed);
            frame?
        };
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.push(frame.clone());
        }
        Some(frame)
    }

    /// Newest frame in the history
    pub fn get_last_buffered(&self) -> Option<&VideoFrame> {
        self.buffer.as_ref()?.last()
    }

    /// Frame at a logical history index, 0 being the oldest
    pub fn get_buffer_frame(&self, index: i64) -> Option<&VideoFrame> {
        self.buffer.as_ref()?.get(index)
    }

    /// Start the background reader when enabled
    pub fn start_async(&mut self) {
        if let Some(reader) = self.async_reader.as_mut() {
            reader.start();
        }
    }

    /// Stop the background reader when enabled
    pub fn stop_async(&mut self) {
        if let Some(reader) = self.async_reader.as_mut() {
            reader.stop();
        }
    }

    /// Whether the background reader is running
    pub fn is_async_running(&self) -> bool {
        self.async_reader
            .as_ref()
            .is_some_and(AsyncFrameReader::is_running)
    }

    /// Latest frame published by the background reader
    pub fn get_last_async_frame(&self) -> Option<VideoFrame> {
        self.async_reader.as_ref()?.get_last()
    }
}

impl std::fmt::Debug for VideoCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoCore")
            .field("source_uri", &self.source_uri)
            .field("config", &self.config)
            .field("buffered", &self.buffer.as_ref().map(RingBuffer::len))
            .field("async_reader", &self.async_reader)
            .finish()
    }
}

impl Drop for VideoCore {
    fn drop(&mut self) {
        self.close();
    }
}
