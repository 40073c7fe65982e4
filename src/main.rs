use std::{path::PathBuf, sync::Arc, time::Duration};

use avmuxer::{
    audio::{
        PcmPool,
        codec::l16::pcm_to_bytes,
        engine::{IngestPacket, run_ingest_loop, run_mix_loop},
        mix::{Mixed, Multiplexer},
    },
    common::{logger, types::AnyResult},
    configs::{Config, DemoSource},
};
use bytes::Bytes;
use flume::Sender;
use tokio::{fs::File, io::AsyncReadExt, io::AsyncWriteExt, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = Config::load(&config_path)?;
    logger::init(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        branch = option_env!("GIT_BRANCH").unwrap_or("unknown"),
        commit = option_env!("GIT_COMMIT").unwrap_or("unknown"),
        config = %config_path.display(),
        "avmuxer starting"
    );

    let mixer_config = config.demo.effective_mixer(&config.mixer);
    if mixer_config.codec != config.mixer.codec {
        warn!(codec = ?config.mixer.codec, "demo only reads raw l16 files, switching codec");
    }
    if mixer_config.buffering != config.mixer.buffering {
        warn!("demo.realtime is off, switching to flush buffering so no input is overwritten");
    }
    if config.demo.sources.is_empty() {
        warn!("no [[demo.sources]] configured, nothing to mix");
        return Ok(());
    }

    let pool = Arc::new(PcmPool::new(&config.pool));
    let mux = Arc::new(Multiplexer::new(mixer_config, pool)?);
    let frame = mux.frame();
    let period = Duration::from_millis(frame.duration_ms() as u64);

    for source in &config.demo.sources {
        mux.add_stream(
            &source.id,
            frame.sample_rate(),
            frame.duration_ms(),
            frame.channels(),
        )?;
    }

    let cancel = CancellationToken::new();
    let (packet_tx, packet_rx) = flume::bounded::<IngestPacket>(256);
    let (mixed_tx, mixed_rx) = flume::bounded::<Mixed>(64);

    let mut readers = JoinSet::new();
    for source in config.demo.sources.clone() {
        readers.spawn(read_source(
            source,
            frame.bytes(),
            config.demo.realtime.then_some(period),
            packet_tx.clone(),
        ));
    }
    drop(packet_tx);

    let ingest = tokio::spawn(run_ingest_loop(mux.clone(), packet_rx, cancel.clone()));
    let mixer = tokio::spawn(run_mix_loop(mux.clone(), period, mixed_tx, cancel.clone()));

    let mut output = File::create(&config.demo.output).await?;
    let writer = tokio::spawn(async move {
        let mut written = 0usize;
        while let Ok(mixed) = mixed_rx.recv_async().await {
            let bytes = mixed_bytes(mixed);
            output.write_all(&bytes).await?;
            written += bytes.len();
        }
        AnyResult::Ok((output, written))
    });

    tokio::select! {
        _ = async {
            while let Some(res) = readers.join_next().await {
                if let Err(e) = res {
                    error!("reader task failed: {e}");
                }
            }
        } => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            readers.abort_all();
        }
    }

    // Readers are done, so the ingest loop ends once the channel is drained.
    let ingest_stats = ingest.await?;
    cancel.cancel();
    let mix_stats = mixer.await?;
    let (mut output, mut written) = writer.await??;

    // Whatever is still buffered goes out without waiting for the timer.
    loop {
        let mixed = mux.tick(frame.samples())?;
        if mixed.is_empty() {
            break;
        }
        let bytes = mixed_bytes(mixed);
        output.write_all(&bytes).await?;
        written += bytes.len();
    }
    output.flush().await?;

    let pool_stats = mux.pool().stats();
    info!(
        output = %config.demo.output.display(),
        bytes = written,
        payloads = ingest_stats.handled,
        dropped = ingest_stats.skipped,
        frames = mix_stats.handled,
        pool_hits = pool_stats.hits,
        pool_misses = pool_stats.misses,
        "mix finished"
    );
    Ok(())
}

/// Stream `source` as frame-sized payloads.
async fn read_source(
    source: DemoSource,
    frame_bytes: usize,
    pace: Option<Duration>,
    tx: Sender<IngestPacket>,
) {
    let mut file = match File::open(&source.path).await {
        Ok(file) => file,
        Err(e) => {
            error!(stream = %source.id, path = %source.path.display(), "cannot open source: {e}");
            return;
        }
    };

    let mut sent = 0u64;
    loop {
        let mut buf = vec![0u8; frame_bytes];
        let n = match read_full(&mut file, &mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                error!(stream = %source.id, "read failed: {e}");
                break;
            }
        };
        // L16 samples are two bytes wide.
        buf.truncate(n - n % 2);
        if buf.is_empty() {
            break;
        }

        let packet = IngestPacket::new(source.id.clone(), Bytes::from(buf));
        if tx.send_async(packet).await.is_err() {
            break;
        }
        sent += 1;

        if let Some(pace) = pace {
            tokio::time::sleep(pace).await;
        }
    }

    info!(stream = %source.id, payloads = sent, "source exhausted");
}

/// Fill `buf` unless the file ends first. Returns the bytes read.
async fn read_full(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn mixed_bytes(mixed: Mixed) -> Vec<u8> {
    match mixed {
        Mixed::Pcm(pcm) => pcm_to_bytes(&pcm),
        Mixed::Encoded(packets) => packets.concat(),
    }
}
