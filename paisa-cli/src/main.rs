use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use paisa_core::{Classifier, CorrectionStore, Lexicons, parse_notification};
use paisa_ingest::{
    DirectLedgerPipeline, IngestOutcome, RawEvent, StagedReviewPipeline,
};

mod store;

use store::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "paisa", version, about = "Transaction-text classifier debug CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Notification,
    Sms,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scored classifier on one text and print the result
    Classify {
        text: String,

        /// Print the full classification as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the staged notification parser on one text
    Parse {
        text: String,

        /// Sender header / app id (e.g. AX-HDFCBK)
        #[arg(long)]
        sender: Option<String>,
    },

    /// Feed one event through a pipeline against ~/.paisa/state.json
    Ingest {
        text: String,

        #[arg(long)]
        sender: Option<String>,

        #[arg(long, value_enum, default_value = "notification")]
        source: Source,
    },

    /// Replay an exported message dump (CSV: sender,body,timestamp_ms)
    Replay {
        csv: PathBuf,

        #[arg(long, value_enum, default_value = "notification")]
        source: Source,
    },

    /// Inspect and resolve the pending review queue
    Pending {
        #[command(subcommand)]
        command: PendingCommand,
    },

    /// Teach a party -> category correction
    Correct { party: String, category: String },

    /// Inspect or reset correction memory
    Memory {
        #[command(subcommand)]
        command: MemoryCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PendingCommand {
    /// List entries surfaced to review (display-capped)
    List,

    /// Accept an entry into the ledger with a category
    Accept {
        id: String,

        #[arg(long, default_value = "Expense")]
        category: String,

        /// Remember this party -> category association
        #[arg(long)]
        learn: bool,
    },

    /// Discard an entry
    Ignore { id: String },
}

#[derive(Subcommand, Debug)]
enum MemoryCommand {
    Show,
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Classify { text, json } => classify_one(&text, json)?,
        Command::Parse { text, sender } => parse_one(&text, sender.as_deref())?,
        Command::Ingest { text, sender, source } => {
            let event = RawEvent::new(text, sender.as_deref(), Utc::now().timestamp_millis());
            ingest_events(&[event], source)?;
        }
        Command::Replay { csv, source } => {
            if !csv.exists() {
                bail!("CSV not found: {}", csv.display());
            }
            let events = read_message_dump(&csv)?;
            println!("Replaying {} events from {}\n", events.len(), csv.display());
            ingest_events(&events, source)?;
        }
        Command::Pending { command } => pending_command(command)?,
        Command::Correct { party, category } => {
            let mut kv = open_state()?;
            let mut memory = CorrectionStore::load(&kv);
            memory.record(&mut kv, &party, &category)?;
            println!("Learned: {} -> {}", party.to_lowercase(), category);
        }
        Command::Memory { command } => {
            let mut kv = open_state()?;
            let mut memory = CorrectionStore::load(&kv);
            match command {
                MemoryCommand::Show => {
                    if memory.is_empty() {
                        println!("(no corrections learned)");
                    }
                    for (party, category) in memory.entries() {
                        println!("{party} -> {category}");
                    }
                }
                MemoryCommand::Clear => {
                    let n = memory.len();
                    memory.clear(&mut kv)?;
                    println!("Cleared {n} corrections");
                }
            }
        }
    }

    Ok(())
}

fn open_state() -> Result<JsonFileStore> {
    JsonFileStore::open(store::state_path()?)
}

fn classify_one(text: &str, json: bool) -> Result<()> {
    let kv = open_state()?;
    let memory = CorrectionStore::load(&kv);
    let classifier = Classifier::new(Lexicons::new()?);

    match classifier.classify(&memory, text) {
        Some(c) if json => println!("{}", serde_json::to_string_pretty(&c)?),
        Some(c) => {
            println!(
                "{:?} {:.2} | {} | party={} | confidence={:.2} | hash={}",
                c.direction,
                c.amount,
                c.category,
                c.party.as_deref().unwrap_or("-"),
                c.confidence,
                c.hash
            );
            if !c.tags.is_empty() {
                println!("tags: {}", c.tags.join(", "));
            }
        }
        None => println!("no classification (no amount, or rejected)"),
    }
    Ok(())
}

fn parse_one(text: &str, sender: Option<&str>) -> Result<()> {
    let lexicons = Lexicons::new()?;
    match parse_notification(&lexicons, text, sender, Utc::now().timestamp_millis()) {
        Some(txn) => println!("{}", serde_json::to_string_pretty(&txn)?),
        None => println!("no parse (no signal, or rejected)"),
    }
    Ok(())
}

fn ingest_events(events: &[RawEvent], source: Source) -> Result<()> {
    let kv = open_state()?;
    let mut queued = 0usize;
    let mut filed = 0usize;
    let mut dropped = 0usize;

    match source {
        Source::Notification => {
            let mut pipeline = StagedReviewPipeline::new(kv)?;
            for event in events {
                match pipeline.handle(event) {
                    IngestOutcome::Queued(id) => {
                        queued += 1;
                        println!("queued  {id}");
                    }
                    IngestOutcome::Dropped(reason) => {
                        dropped += 1;
                        println!("dropped {reason:?}");
                    }
                    IngestOutcome::Filed(_) => unreachable!("staged path never files directly"),
                }
            }
        }
        Source::Sms => {
            let mut pipeline = DirectLedgerPipeline::new(kv)?;
            // Ledger hashes would come from the expense store; the CLI
            // only dedups within one replay run.
            let mut known = HashSet::new();
            for event in events {
                match pipeline.handle(event, &known) {
                    IngestOutcome::Filed(entry) => {
                        filed += 1;
                        known.insert(entry.hash.clone());
                        println!(
                            "filed   {:>10.2} {} | {}",
                            entry.amount, entry.category, entry.title
                        );
                    }
                    IngestOutcome::Dropped(reason) => {
                        dropped += 1;
                        println!("dropped {reason:?}");
                    }
                    IngestOutcome::Queued(_) => unreachable!("direct path never queues"),
                }
            }
        }
    }

    println!("\n{queued} queued, {filed} filed, {dropped} dropped");
    Ok(())
}

fn pending_command(command: PendingCommand) -> Result<()> {
    let kv = open_state()?;
    let mut pipeline = StagedReviewPipeline::new(kv)?;
    let now_ms = Utc::now().timestamp_millis();

    match command {
        PendingCommand::List => {
            let total = pipeline.pending_len();
            let visible = pipeline.visible(now_ms);
            if visible.is_empty() {
                println!("(nothing pending)");
                return Ok(());
            }
            for entry in visible {
                let t = &entry.txn;
                println!(
                    "{} | {} | {:?} {} | {} | conf={}",
                    t.id,
                    t.timestamp,
                    t.direction,
                    t.amount.map(|a| format!("₹{a:.2}")).unwrap_or_else(|| "-".to_string()),
                    t.merchant.as_deref().unwrap_or("-"),
                    t.confidence
                );
            }
            if total > visible.len() {
                println!("... and {} more queued", total - visible.len());
            }
        }
        PendingCommand::Accept { id, category, learn } => {
            let entry = pipeline
                .accept(&id, &category, learn)?
                .with_context(|| format!("no pending entry {id}"))?;
            println!("accepted into ledger:");
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        PendingCommand::Ignore { id } => {
            match pipeline.ignore(&id)? {
                Some(_) => println!("ignored {id}"),
                None => println!("no pending entry {id}"),
            }
        }
    }
    Ok(())
}

/// Read an exported message dump: CSV with `sender,body,timestamp_ms`
/// headers. Rows with an empty body are skipped.
fn read_message_dump(path: &PathBuf) -> Result<Vec<RawEvent>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut events = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let sender = record.get(0).unwrap_or("").trim();
        let body = record.get(1).unwrap_or("").trim();
        if body.is_empty() {
            continue;
        }
        let timestamp_ms = record
            .get(2)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        events.push(RawEvent::new(
            body,
            (!sender.is_empty()).then_some(sender),
            timestamp_ms,
        ));
    }
    Ok(events)
}
