//! Hybrid Playback Demo - Seek, Read and Watch Frames over Synthetic Backends
//!
//! Wires a fast backend with keyframe-only position drift and a timeline
//! backend into a hybrid decoder, then exercises seeking, the frame history
//! and the background reader.
//!
//! ```bash
//! RUST_LOG=framekit_media=debug cargo run --example hybrid_playback
//! ```

use framekit::{
    init_logging, BackendRegistry, DecoderKind, SeekMode, SyntheticProfile, VideoCore,
    VideoCoreConfig,
};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info");

    println!("🎞️  Hybrid Playback Demo");
    println!("========================");

    // Fast backend: cheap reads, but it lies about the frame count
    let fast = SyntheticProfile::fast(300, 30.0).with_reported(Some(30.0), Some(1_000));
    // Timeline backend: accurate metadata, seeks land on keyframes
    let timeline = SyntheticProfile::timeline(300, 30.0).with_seek_mode(SeekMode::Keyframe);
    let registry = BackendRegistry::synthetic(fast, timeline);

    let config = VideoCoreConfig::default()
        .with_decoder(DecoderKind::Hybrid)
        .with_buffer_size(8)
        .with_async(Duration::from_millis(5));

    let mut core = VideoCore::new("rtsp://demo.local/stream", config, registry)?;
    core.open()?;

    let metadata = core.get_metadata();
    println!(
        "📊 Metadata: {:?} fps, {:?} frames",
        metadata.fps, metadata.total_frames
    );

    // Navigation
    for target in [0, 42, 150, 5_000] {
        let ok = core.go_to_frame(target);
        println!(
            "🎯 go_to_frame({}) -> {} (position {})",
            target,
            ok,
            core.get_decoder_frame_id()
        );
    }

    // Sequential reads feed the history
    core.go_to_frame(100);
    for _ in 0..12 {
        if let Some(frame) = core.get_frame() {
            println!(
                "🖼️  frame {} at {} ms ({} bytes, keyframe: {})",
                frame.index,
                frame.timestamp,
                frame.size(),
                frame.is_keyframe
            );
        }
    }
    if let Some(oldest) = core.get_buffer_frame(0) {
        println!("📚 History holds frames {}..", oldest.index);
    }
    if let Some(newest) = core.get_last_buffered() {
        println!("📚 Newest buffered frame: {}", newest.index);
    }

    // Background reading
    println!("🚀 Starting background reader...");
    core.start_async();
    for _ in 0..5 {
        std::thread::sleep(Duration::from_millis(50));
        match core.get_last_async_frame() {
            Some(frame) => println!("⏱️  latest frame: {}", frame.index),
            None => println!("⏱️  no frame yet"),
        }
    }
    core.stop_async();

    core.close();
    println!("✅ Done");
    Ok(())
}
