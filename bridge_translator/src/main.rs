//! Replay binary.
//!
//! Usage:
//!   cargo run -p bridge_translator --bin bridge-replay -- --fixture session.json [--config bridge.json] [--input packets.jsonl]
//!
//! Builds a session from the fixture, feeds it the inbound packets (one JSON
//! object per line, stdin when `--input` is absent) and prints every emitted
//! packet as a JSON line tagged `front` or `back`.

use std::{env, sync::Arc};

use anyhow::Context;
use bridge_shared::{
    codec::{decode_line, encode_line},
    config::TranslatorConfig,
    protocol::{BackPacket, FrontPacket, InboundPacket},
};
use bridge_translator::{
    collaborators::{NoopServices, SystemClock},
    fixture::ReplayFixture,
    rotation::REVERT_DELAY,
    scheduler::TokioScheduler,
    Collaborators, Session, SessionDriver,
};
use serde::Serialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader},
    sync::mpsc,
};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    fixture: Option<String>,
    input: Option<String>,
}

fn parse_args() -> Args {
    let mut out = Args::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(args[i + 1].clone());
                i += 2;
            }
            "--fixture" if i + 1 < args.len() => {
                out.fixture = Some(args[i + 1].clone());
                i += 2;
            }
            "--input" if i + 1 < args.len() => {
                out.input = Some(args[i + 1].clone());
                i += 2;
            }
            _ => i += 1,
        }
    }
    out
}

/// One emitted packet, tagged with its direction.
#[derive(Debug, Serialize)]
#[serde(tag = "dir", content = "packet", rename_all = "snake_case")]
enum Emitted {
    Front(FrontPacket),
    Back(BackPacket),
}

async fn load_config(path: Option<&str>) -> anyhow::Result<TranslatorConfig> {
    let Some(path) = path else {
        return Ok(TranslatorConfig::default());
    };
    match tokio::fs::read_to_string(path).await {
        Ok(text) => TranslatorConfig::from_json_str(&text).with_context(|| format!("parse {path}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TranslatorConfig::default()),
        Err(e) => Err(e).with_context(|| format!("read {path}")),
    }
}

async fn print_emitted(
    mut front: mpsc::UnboundedReceiver<FrontPacket>,
    mut back: mpsc::UnboundedReceiver<BackPacket>,
) -> anyhow::Result<usize> {
    let mut stdout = tokio::io::stdout();
    let mut printed = 0;
    let (mut front_open, mut back_open) = (true, true);
    while front_open || back_open {
        let emitted = tokio::select! {
            p = front.recv(), if front_open => match p {
                Some(p) => Emitted::Front(p),
                None => { front_open = false; continue; }
            },
            p = back.recv(), if back_open => match p {
                Some(p) => Emitted::Back(p),
                None => { back_open = false; continue; }
            },
        };
        stdout.write_all(&encode_line(&emitted)?).await?;
        printed += 1;
    }
    stdout.flush().await?;
    Ok(printed)
}

async fn feed<R: AsyncRead + Unpin>(
    reader: R,
    inbound: &mpsc::Sender<InboundPacket>,
) -> anyhow::Result<usize> {
    let mut lines = BufReader::new(reader).lines();
    let mut fed = 0;
    let mut line_no = 0;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match decode_line::<InboundPacket>(line.as_bytes()) {
            Ok(packet) => {
                inbound.send(packet).await.context("session driver stopped")?;
                fed += 1;
            }
            Err(e) => warn!(line = line_no, error = %e, "skipping malformed packet"),
        }
    }
    Ok(fed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args();
    let cfg = load_config(args.config.as_deref()).await?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cfg.log_filter.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let fixture_path = args.fixture.context("--fixture is required")?;
    let text = tokio::fs::read_to_string(&fixture_path)
        .await
        .with_context(|| format!("read {fixture_path}"))?;
    let fixture = ReplayFixture::from_json_str(&text)?;
    info!(fixture = %fixture_path, session = %fixture.name, "Starting replay");

    let (front_tx, front_rx) = mpsc::unbounded_channel();
    let (back_tx, back_rx) = mpsc::unbounded_channel();
    let (scheduler, fired) = TokioScheduler::new();

    let mut session = Session::new(
        fixture.name.clone(),
        Arc::new(cfg),
        fixture.player.clone(),
        Collaborators {
            world: Arc::new(fixture.world()),
            registries: Arc::new(fixture.registries()),
            services: Box::new(NoopServices),
            back: Box::new(back_tx),
            front: Box::new(front_tx),
            scheduler: Arc::new(scheduler),
            clock: Arc::new(SystemClock),
        },
    );
    fixture.populate(&mut session);

    let printer = tokio::spawn(print_emitted(front_rx, back_rx));
    let (inbound, driver) = SessionDriver::spawn(session, fired);

    let fed = match args.input.as_deref() {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("open {path}"))?;
            feed(file, &inbound).await?
        }
        None => feed(tokio::io::stdin(), &inbound).await?,
    };

    // Let a pending rotation revert fire before shutting down.
    tokio::time::sleep(REVERT_DELAY * 2).await;
    drop(inbound);
    let session = driver.await.context("session driver panicked")?;
    drop(session);

    let printed = printer.await.context("printer panicked")??;
    info!(fed, printed, "Replay finished");
    Ok(())
}
