//! `engine/driver.rs` — async loops around a shared [`Multiplexer`].
//!
//! [`run_ingest_loop`] feeds payloads from a channel into the multiplexer.
//! [`run_mix_loop`] ticks on a fixed period and forwards every non-empty mix.
//! Both stop on cancellation or when their channel peer goes away.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use flume::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::audio::mix::{Mixed, Multiplexer};

/// One encoded payload addressed to a registered stream.
#[derive(Debug, Clone)]
pub struct IngestPacket {
    pub stream_id: String,
    pub payload: Bytes,
}

impl IngestPacket {
    pub fn new(stream_id: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            stream_id: stream_id.into(),
            payload: payload.into(),
        }
    }
}

/// Counters reported when a loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub handled: u64,
    pub skipped: u64,
}

/// Decode packets from `rx` into `mux` until cancelled or all senders drop.
///
/// Packets that fail to process are logged and counted as skipped.
pub async fn run_ingest_loop(
    mux: Arc<Multiplexer>,
    rx: Receiver<IngestPacket>,
    cancel: CancellationToken,
) -> LoopStats {
    let mut stats = LoopStats::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            packet = rx.recv_async() => {
                let Ok(packet) = packet else { break };
                match mux.process(&packet.payload, &packet.stream_id) {
                    Ok(n) => {
                        stats.handled += 1;
                        trace!(stream = %packet.stream_id, samples = n, "payload buffered");
                    }
                    Err(e) => {
                        stats.skipped += 1;
                        warn!(stream = %packet.stream_id, "dropping payload: {e}");
                    }
                }
            }
        }
    }

    debug!(handled = stats.handled, skipped = stats.skipped, "ingest loop stopped");
    stats
}

/// Mix one configured frame per `period` and send non-empty results to `tx`.
///
/// Missed ticks are skipped rather than bunched up. Empty cycles count as
/// skipped.
pub async fn run_mix_loop(
    mux: Arc<Multiplexer>,
    period: Duration,
    tx: Sender<Mixed>,
    cancel: CancellationToken,
) -> LoopStats {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let frame_len = mux.frame().samples();
    let mut stats = LoopStats::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let mixed = match mux.tick(frame_len) {
                    Ok(mixed) => mixed,
                    Err(e) => {
                        stats.skipped += 1;
                        warn!("mix cycle failed: {e}");
                        continue;
                    }
                };
                if mixed.is_empty() {
                    stats.skipped += 1;
                    continue;
                }
                if tx.send_async(mixed).await.is_err() {
                    debug!("mix receiver dropped");
                    break;
                }
                stats.handled += 1;
            }
        }
    }

    debug!(sent = stats.handled, empty = stats.skipped, "mix loop stopped");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::PcmPool;
    use crate::audio::codec::l16::pcm_to_bytes;
    use crate::configs::{Buffering, CodecKind, MixerConfig};

    fn mux() -> Arc<Multiplexer> {
        let config = MixerConfig {
            sample_rate: 8_000,
            channels: 1,
            frame_duration_ms: 10,
            codec: CodecKind::L16,
            buffering: Buffering::Flush,
            ring_frames: 4,
        };
        let mux = Multiplexer::new(config, Arc::new(PcmPool::default())).unwrap();
        mux.add_stream("a", 8_000, 10, 1).unwrap();
        Arc::new(mux)
    }

    #[tokio::test]
    async fn ingest_runs_until_senders_drop() {
        let mux = mux();
        let (tx, rx) = flume::unbounded();
        tx.send(IngestPacket::new("a", pcm_to_bytes(&[5; 4]))).unwrap();
        tx.send(IngestPacket::new("ghost", pcm_to_bytes(&[5; 4]))).unwrap();
        tx.send(IngestPacket::new("a", pcm_to_bytes(&[6; 4]))).unwrap();
        drop(tx);

        let stats = run_ingest_loop(mux.clone(), rx, CancellationToken::new()).await;
        assert_eq!(stats, LoopStats { handled: 2, skipped: 1 });
        assert_eq!(mux.read_pcm(80), vec![5, 5, 5, 5, 6, 6, 6, 6]);
    }

    #[tokio::test]
    async fn ingest_stops_on_cancel() {
        let (_tx, rx) = flume::unbounded::<IngestPacket>();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(run_ingest_loop(mux(), rx, cancel).await, LoopStats::default());
    }

    #[tokio::test]
    async fn mix_loop_forwards_non_empty_cycles() {
        let mux = mux();
        mux.process(&pcm_to_bytes(&[7; 8]), "a").unwrap();

        let (tx, rx) = flume::unbounded();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_mix_loop(
            mux.clone(),
            Duration::from_millis(2),
            tx,
            cancel.clone(),
        ));

        let first = rx.recv_async().await.unwrap();
        assert_eq!(first, Mixed::Pcm(vec![7; 8]));

        cancel.cancel();
        let stats = task.await.unwrap();
        assert_eq!(stats.handled, 1);
    }

    #[tokio::test]
    async fn mix_loop_stops_when_receiver_drops() {
        let mux = mux();
        mux.process(&pcm_to_bytes(&[1; 8]), "a").unwrap();

        let (tx, rx) = flume::unbounded();
        drop(rx);
        let stats = run_mix_loop(
            mux,
            Duration::from_millis(2),
            tx,
            CancellationToken::new(),
        )
        .await;
        assert_eq!(stats.handled, 0);
    }
}
