use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use daybook::config::DEFAULT_RETENTION_DAYS;
use daybook::persistence::DATE_FORMAT;
use daybook::{Daybook, RecoveryEngine, RetentionPolicy, SnapshotWriter, StoreConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daybook-tool")]
#[command(about = "Maintenance tooling for a daybook data directory")]
struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Days a daily log is kept
    #[arg(long, global = true, default_value_t = DEFAULT_RETENTION_DAYS)]
    retention_days: u32,

    /// Activity label counted as study
    #[arg(long, global = true)]
    study_kind: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Totals, streaks and where the history was loaded from
    Summary,
    /// Print one day's timeline
    Show {
        date: String,
    },
    /// Mark an hour slot as done
    Schedule {
        date: String,
        hour: u8,
        kind: String,
    },
    /// Clear one hour, or the whole day when no hour is given
    Clear {
        date: String,
        hour: Option<u8>,
    },
    /// Rebuild history from the daily logs
    Recover {
        /// Overwrite the primary snapshot with the recovered history
        #[arg(long)]
        apply: bool,
    },
    /// Delete daily logs older than the retention horizon
    Prune,
    /// Export the full history
    Backup {
        path: PathBuf,
    },
    /// Replace the full history with an export
    Restore {
        path: PathBuf,
    },
    /// Show or set the daily target hours
    Target {
        hours: Option<i64>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.data_dir {
        Some(dir) => StoreConfig::new(dir),
        None => StoreConfig::default_location(),
    }
    .retention_days(cli.retention_days);
    if let Some(kind) = &cli.study_kind {
        config = config.study_kind(kind);
    }

    match cli.command {
        Command::Summary => summary(config),
        Command::Show { date } => show(config, &date),
        Command::Schedule { date, hour, kind } => {
            let mut book = open(config)?;
            book.schedule(parse_date(&date)?, hour, &kind)
                .with_context(|| format!("Failed to schedule {} at {}:00", kind, hour))?;
            println!("Scheduled {} at {}:00 on {}", kind, hour, date);
            Ok(())
        }
        Command::Clear { date, hour } => {
            let mut book = open(config)?;
            let day = parse_date(&date)?;
            let cleared = match hour {
                Some(hour) => book.clear_hour(day, hour),
                None => book.clear_day(day),
            };
            cleared.with_context(|| format!("Failed to clear {}", date))?;
            println!("Cleared {}", date);
            Ok(())
        }
        Command::Recover { apply } => recover(config, apply),
        Command::Prune => {
            let book = open(config)?;
            let policy = RetentionPolicy::new(book.config().retention_days);
            let removed = policy
                .prune(&book.config().log_path(), book.today())
                .context("Failed to prune daily logs")?;
            println!(
                "Removed {} logs older than {} days",
                removed,
                policy.horizon_days()
            );
            Ok(())
        }
        Command::Backup { path } => {
            let book = open(config)?;
            book.create_backup(&path)
                .with_context(|| format!("Failed to write backup '{}'", path.display()))?;
            println!("Backed up {} days to {}", book.records().len(), path.display());
            Ok(())
        }
        Command::Restore { path } => {
            let mut book = open(config)?;
            let days = book
                .restore_from_backup(&path)
                .with_context(|| format!("Failed to restore from '{}'", path.display()))?;
            println!("Restored {} days from {}", days, path.display());
            if let Some(safety) = book.safety_backup_path().filter(|p| p.exists()) {
                println!("Previous history saved to {}", safety.display());
            }
            Ok(())
        }
        Command::Target { hours } => {
            let mut book = open(config)?;
            if let Some(hours) = hours {
                book.set_target_hours(hours)
                    .with_context(|| format!("Cannot set target to {}", hours))?;
            }
            println!("Daily target: {} hours", book.target_hours());
            Ok(())
        }
    }
}

fn open(config: StoreConfig) -> Result<Daybook> {
    let root = config.root().display().to_string();
    Daybook::open(config).with_context(|| format!("Failed to open daybook at '{}'", root))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| anyhow!("Invalid date '{}' (expected yyyy-MM-dd): {}", input, e))
}

fn summary(config: StoreConfig) -> Result<()> {
    let book = open(config)?;
    let stats = book.stats();

    println!("Data directory:     {}", book.config().root().display());
    println!("Loaded from:        {:?}", book.load_source());
    println!("Days recorded:      {}", book.records().len());
    println!("Daily target:       {} hours", book.target_hours());
    println!("Current streak:     {} days", book.current_streak());
    println!("Longest streak:     {} days", book.max_continuous_days());
    println!("Study days:         {}", stats.total_study_days);
    println!("Study hours:        {}", stats.total_study_hours);
    println!("Average per day:    {:.1} hours", stats.average_study_hours_per_day());
    println!(
        "Activities:         {}/{} ({:.1}%)",
        stats.completed_activities,
        stats.total_activities,
        stats.completion_rate()
    );
    Ok(())
}

fn show(config: StoreConfig, date: &str) -> Result<()> {
    let day = parse_date(date)?;
    let book = open(config)?;
    let Some(record) = book.peek(day) else {
        println!("No record for {}", date);
        return Ok(());
    };

    println!(
        "{}: {} study hours, {}/{} done",
        date, record.study_hours, record.completed_count, record.total_count
    );
    if !record.is_consistent(&book.config().study_kind) {
        println!("  (stored counters differ from the timeline below)");
    }
    for (hour, activity) in &record.timeline {
        let mark = if activity.completed { "x" } else { " " };
        println!("  {:02}:00 [{}] {}", hour, mark, activity.kind);
    }
    Ok(())
}

fn recover(config: StoreConfig, apply: bool) -> Result<()> {
    let report = RecoveryEngine::recover(&config.log_path());
    println!(
        "Scanned {} logs ({} skipped): {} days, longest streak {}",
        report.scanned.len(),
        report.skipped,
        report.recovered_days,
        report.snapshot.max_continuous_days
    );
    for (date, record) in report.snapshot.store.iter() {
        println!("  {}  {} study hours", date.format(DATE_FORMAT), record.study_hours);
    }

    if apply {
        if report.is_empty() {
            return Err(anyhow!("Nothing recovered, leaving the snapshot alone"));
        }
        let writer = SnapshotWriter::new(config.snapshot_path());
        writer
            .commit(&report.snapshot.store, report.snapshot.max_continuous_days)
            .with_context(|| format!("Failed to write '{}'", writer.path().display()))?;
        println!("Wrote recovered history to {}", writer.path().display());
    }
    Ok(())
}
