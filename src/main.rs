use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use icestats::{AsyncStatsReader, Config, FeedReader, StatsEvent, StatsSnapshot, Topic};
use tokio::io::{AsyncBufRead, AsyncRead, BufReader};

#[derive(Parser)]
#[command(name = "icestats", about = "Decode Icecast stats feeds and stats XML documents")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON) layered over the built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level, overriding RUST_LOG and the configured filter.
    #[arg(long, global = true)]
    debug: bool,

    /// Append logs to this file instead of stderr (tail -f to inspect).
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a captured STATS feed; prints one JSON object per notification.
    Feed {
        /// Feed capture to read. Reads stdin when omitted.
        file: Option<PathBuf>,
        /// Topic to print: `*`, `server.*`, `mount.*` or an event name.
        #[arg(long, default_value = "*")]
        topic: String,
    },
    /// Decode a stats XML document; prints one JSON object per entity.
    Stats {
        /// Document to read. Reads stdin when omitted.
        file: Option<PathBuf>,
        /// Print the whole document as one server / sources / listeners tree.
        #[arg(long)]
        snapshot: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&cli, &config)?;

    match cli.command {
        Command::Feed { file, topic } => feed(file.as_deref(), &topic, &config).await,
        Command::Stats { file, snapshot } => stats(file.as_deref(), snapshot).await,
    }
}

fn init_tracing(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter))
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

async fn open(file: Option<&Path>) -> anyhow::Result<Box<dyn AsyncRead + Unpin + Send>> {
    Ok(match file {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    })
}

async fn feed(file: Option<&Path>, topic: &str, config: &Config) -> anyhow::Result<()> {
    let topic: Topic = topic.parse()?;
    let mut reader = FeedReader::with_config(open(file).await?, &config.feed);
    let mut notifications = reader.subscribe(topic);
    let decode = tokio::spawn(reader.run());

    let mut out = std::io::stdout().lock();
    while let Some(notification) = notifications.recv().await {
        let line = serde_json::json!({
            "topic": notification.topic.to_string(),
            "event": &*notification.event,
        });
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;
    }

    let summary = decode.await?.context("reading feed")?;
    tracing::info!(
        lines = summary.lines,
        bytes = summary.bytes,
        dropped_bytes = summary.dropped_bytes,
        "feed decoded"
    );
    Ok(())
}

async fn stats(file: Option<&Path>, snapshot: bool) -> anyhow::Result<()> {
    let source: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(BufReader::new(open(file).await?));
    let mut out = std::io::stdout().lock();

    if snapshot {
        let snapshot = StatsSnapshot::from_async_reader(source)
            .await
            .context("decoding stats document")?;
        serde_json::to_writer_pretty(&mut out, &snapshot)?;
        writeln!(out)?;
        return Ok(());
    }

    let mut reader = AsyncStatsReader::new(source);
    let mut entities = 0usize;
    while let Some(event) = reader.next().await {
        let event = event.context("decoding stats document")?;
        if event == StatsEvent::Finished {
            break;
        }
        serde_json::to_writer(&mut out, &event)?;
        writeln!(out)?;
        entities += 1;
    }
    tracing::info!(entities, "stats document decoded");
    Ok(())
}
