use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use covenant_core::config::CoreConfig;
use covenant_core::logging;
use covenant_core::serde_utils;
use covenant_protocol::{codec, TimeInput};
use covenant_store::{FileStore, Session, TimelineStore};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "covenant")]
#[command(about = "Covenant - branching interval timelines over calendar time", long_about = None)]
struct Cli {
    /// Directory holding timeline documents
    #[arg(long, global = true, env = "COVENANT_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new timeline with its founding interval
    Init(InitArgs),
    /// Insert an interval into an existing timeline
    Insert(InsertArgs),
    /// Show the interval active at a given instant
    Active(ActiveArgs),
    /// Print a human-readable report of a timeline
    Show(TimelineArg),
    /// Export a timeline document as JSON
    Export(TimelineArg),
    /// Show version information
    Version,
}

#[derive(Args)]
struct InitArgs {
    /// Start of the founding interval (RFC 3339, or naive to assume UTC)
    #[arg(long)]
    start: String,
    /// End of the founding interval
    #[arg(long)]
    end: String,
    /// Payload as a JSON object
    #[arg(long)]
    payload: String,
    /// Optional metadata as a JSON object
    #[arg(long)]
    metadata: Option<String>,
}

#[derive(Args)]
struct InsertArgs {
    /// Identifier of the timeline to branch
    #[arg(long)]
    timeline: Uuid,
    #[arg(long)]
    start: String,
    /// Defaults to the end of the active envelope
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    payload: String,
}

#[derive(Args)]
struct ActiveArgs {
    #[arg(long)]
    timeline: Uuid,
    /// Instant to look up
    #[arg(long)]
    at: String,
}

#[derive(Args)]
struct TimelineArg {
    #[arg(long)]
    timeline: Uuid,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = logging::init_tracing(None) {
        eprintln!("failed to initialise tracing: {err}");
    }

    let store = open_store(cli.data_dir)?;

    match cli.command {
        Commands::Init(args) => {
            let mut session = Session::new(store);
            let id = session
                .init(
                    parse_time(&args.start)?,
                    parse_time(&args.end)?,
                    parse_object(&args.payload)?,
                    match args.metadata {
                        Some(raw) => parse_object(&raw)?,
                        None => Map::new(),
                    },
                )
                .await?;
            println!("{id}");
        }
        Commands::Insert(args) => {
            let mut session = Session::new(store);
            session.open(args.timeline).await?;
            let end = args.end.as_deref().map(parse_time).transpose()?;
            let interval = session
                .insert(parse_object(&args.payload)?, parse_time(&args.start)?, end)
                .await?;
            println!("{interval}");
        }
        Commands::Active(args) => {
            let mut session = Session::new(store);
            session.open(args.timeline).await?;
            match session.active_at(parse_time(&args.at)?) {
                Some(interval) => println!("{interval}"),
                None => println!("no active interval at {}", args.at),
            }
        }
        Commands::Show(args) => {
            let mut session = Session::new(store);
            session.open(args.timeline).await?;
            let report = session.describe().expect("an opened session holds a timeline");
            println!("{report}");
        }
        Commands::Export(args) => {
            let timeline = store
                .load(args.timeline)
                .await?
                .ok_or_else(|| anyhow!("timeline not found: {}", args.timeline))?;
            let document = codec::encode(&timeline)?;
            println!("{}", serde_utils::to_pretty_json(&document)?);
        }
        Commands::Version => {
            println!("covenant {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn open_store(data_dir: Option<PathBuf>) -> anyhow::Result<FileStore> {
    let root = match data_dir {
        Some(dir) => dir,
        None => {
            CoreConfig::from_env()
                .context("loading configuration")?
                .data_dir
        }
    };
    Ok(FileStore::new(root))
}

/// Accepts RFC 3339 timestamps; naive datetimes or bare dates are passed
/// through for the protocol layer to normalize as UTC.
fn parse_time(raw: &str) -> anyhow::Result<TimeInput> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Ok(aware.into());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.into());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time of day");
        return Ok(midnight.into());
    }
    bail!("unrecognized timestamp `{raw}`; expected RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`")
}

fn parse_object(raw: &str) -> anyhow::Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).context("parsing JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object, found {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn rfc3339_timestamps_parse_as_aware() {
        let parsed = parse_time("2022-10-10T12:00:00+02:00").expect("parse");
        assert_eq!(
            parsed,
            TimeInput::Aware(Utc.with_ymd_and_hms(2022, 10, 10, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn naive_timestamps_parse_as_naive() {
        let parsed = parse_time("2022-10-10T12:00:00").expect("parse");
        assert!(matches!(parsed, TimeInput::Naive(_)));

        let parsed = parse_time("2022-10-10").expect("parse");
        assert!(matches!(parsed, TimeInput::Naive(_)));
    }

    #[test]
    fn junk_timestamps_are_rejected() {
        assert!(parse_time("next tuesday").is_err());
    }

    #[test]
    fn payloads_must_be_json_objects() {
        assert!(parse_object("{\"key\": \"world\"}").is_ok());
        assert!(parse_object("[1, 2, 3]").is_err());
        assert!(parse_object("not json").is_err());
    }
}
