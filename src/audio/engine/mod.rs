//! `engine/mod.rs` — components that turn buffered streams into output.
//!
//! | Component | Description |
//! |---|---|
//! | [`Transcoder`] | One source stream → one encoder, frame by frame |
//! | [`driver`] | Timer-driven mix loop and channel-fed ingest loop around a `Multiplexer` |

pub mod driver;
pub mod transcode;

pub use driver::{IngestPacket, LoopStats, run_ingest_loop, run_mix_loop};
pub use transcode::Transcoder;
