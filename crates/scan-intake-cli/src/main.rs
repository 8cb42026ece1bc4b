mod commands;
mod logging;
mod progress;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use scan_intake_core::record::SystemClock;
use scan_intake_core::storage::Database;
use scan_intake_core::{
    classify, export, persist, AppConfig, Detection, DuplicateHandling, IntakeEngine, Outcome,
    SessionContext,
};
use tracing::{error, info, warn};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn main() -> CliResult {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let loaded = match args.config.as_deref() {
        Some(path) => scan_intake_core::config::load_configuration_from(path),
        None => scan_intake_core::config::load_configuration(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Scan {
            input,
            format,
            user,
        }) => run_scan(&config, input.as_deref(), &format, user.as_deref()),
        Some(Commands::Classify { text }) => {
            print_classification(&text);
            Ok(())
        }
        Some(Commands::Recent { limit }) => run_recent(&config, limit.unwrap_or(config.recent_limit)),
        Some(Commands::Stats) => run_stats(&config),
        Some(Commands::Sessions) => run_sessions(&config),
        Some(Commands::Delete { id }) => run_delete(&config, &id),
        Some(Commands::Clear { yes }) => run_clear(&config, yes),
        Some(Commands::ExportCsv { path }) => run_export_csv(&config, &path),
        Some(Commands::ExportJson { path }) => run_export_json(&config, &path),
        Some(Commands::SyncJson { path }) => run_sync_json(&config, &path),
        Some(Commands::ImportJson { path }) => run_import_json(&config, &path),
        Some(Commands::SetDuplicates { policy }) => run_set_duplicates(&config, policy),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {}", err);
        process::exit(1);
    }

    Ok(())
}

fn open_db(config: &AppConfig) -> CliResult<Database> {
    Ok(Database::open(&config.db_path)?)
}

/// Saved policy wins over the configured default.
fn effective_policy(db: &Database, config: &AppConfig) -> CliResult<DuplicateHandling> {
    Ok(db
        .get_duplicate_handling()?
        .unwrap_or(config.duplicate_handling))
}

fn load_log(db: &Database) -> CliResult<scan_intake_core::ScanLog> {
    let report = db.load_records()?;
    for skipped in &report.skipped {
        warn!("{}", skipped);
    }
    Ok(report.log)
}

fn run_scan(
    config: &AppConfig,
    input: Option<&Path>,
    format: &str,
    user: Option<&str>,
) -> CliResult {
    let db = open_db(config)?;
    let policy = effective_policy(&db, config)?;
    let log = load_log(&db)?;

    let context = SessionContext::start(user.unwrap_or(&config.user), &SystemClock);
    info!(
        "Session {} started for '{}' (duplicates: {}, {} records on file)",
        context.session_id,
        context.user,
        policy,
        log.len()
    );
    let engine = IntakeEngine::new(context, policy).with_log(log);

    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let reporter = CliReporter::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let detection = Detection::parse_line(&line, format);
        if let Outcome::Accepted(record) = engine.process(&detection, &reporter)? {
            db.insert_record(&record)?;
        }
    }
    reporter.finish();

    let counters = engine.counters();
    info!(
        "{} accepted, {} duplicates, {} ignored in session {}",
        format!("{}", counters.accepted).green(),
        format!("{}", counters.duplicates).yellow(),
        format!("{}", counters.rejected).red(),
        engine.context().session_id,
    );
    info!(
        "{} of {} records on file have a valid checksum",
        engine.log().valid_count(),
        engine.log().len()
    );
    Ok(())
}

fn print_classification(text: &str) {
    let c = classify(text);
    if c.is_valid {
        let checksum = if c.checksum_valid {
            "valid".green()
        } else {
            "invalid".red()
        };
        println!(
            "{} {} vendor: {}, checksum: {}",
            c.barcode_type.to_string().cyan(),
            text.trim(),
            c.vendor,
            checksum
        );
    } else {
        println!("{} {:?} is not a recognised code", "Unknown".red(), text.trim());
    }
}

fn run_recent(config: &AppConfig, limit: usize) -> CliResult {
    let db = open_db(config)?;
    let log = load_log(&db)?;
    for record in log.recent(limit) {
        println!(
            "{}  {:<7} {:<16} {:<8} {}  {}",
            export::iso_timestamp(record.timestamp),
            record.barcode_type,
            record.text,
            record.vendor,
            if record.checksum_valid { "✓".green() } else { "✗".red() },
            record.id.dimmed(),
        );
    }
    Ok(())
}

fn run_stats(config: &AppConfig) -> CliResult {
    let db = open_db(config)?;
    let policy = effective_policy(&db, config)?;
    let log = load_log(&db)?;

    println!("Records:         {}", log.len());
    println!("Checksum valid:  {}", format!("{}", log.valid_count()).green());
    println!("Duplicate mode:  {}", policy);
    for barcode_type in [
        scan_intake_core::BarcodeType::Imei,
        scan_intake_core::BarcodeType::Meid,
        scan_intake_core::BarcodeType::UpcA,
        scan_intake_core::BarcodeType::UpcE,
        scan_intake_core::BarcodeType::Ean13,
    ] {
        let count = log
            .iter()
            .filter(|r| r.barcode_type == barcode_type)
            .count();
        if count > 0 {
            println!("  {:<7} {}", barcode_type, count);
        }
    }
    Ok(())
}

fn run_sessions(config: &AppConfig) -> CliResult {
    let db = open_db(config)?;
    for s in db.list_sessions()? {
        println!(
            "{}  {:<12} {:>5} scans ({} valid)  {} → {}",
            s.session_id.cyan(),
            s.user,
            s.record_count,
            s.valid_count,
            export::iso_timestamp(s.first_scan),
            export::iso_timestamp(s.last_scan),
        );
    }
    Ok(())
}

fn run_delete(config: &AppConfig, id: &str) -> CliResult {
    let db = open_db(config)?;
    if db.delete_record(id)? {
        println!("Deleted {}", id);
    } else {
        println!("No record with id {}", id);
    }
    Ok(())
}

fn run_clear(config: &AppConfig, yes: bool) -> CliResult {
    if !yes
        && !prompt_confirm(
            "Are you SURE you want to delete ALL stored scans?",
            Some(false),
        )?
    {
        return Ok(());
    }
    let db = open_db(config)?;
    let removed = db.clear_records()?;
    println!("Cleared {} records", removed);
    Ok(())
}

fn run_export_csv(config: &AppConfig, path: &Path) -> CliResult {
    let db = open_db(config)?;
    let log = load_log(&db)?;
    let count = export::write_csv(log.records(), File::create(path)?)?;
    info!("Exported {} records to {}", count, path.display());
    Ok(())
}

fn run_export_json(config: &AppConfig, path: &Path) -> CliResult {
    let db = open_db(config)?;
    let log = load_log(&db)?;
    fs::write(path, persist::records_to_json(log.records())?)?;
    info!("Exported {} records to {}", log.len(), path.display());
    Ok(())
}

fn run_sync_json(config: &AppConfig, path: &Path) -> CliResult {
    let db = open_db(config)?;
    let log = load_log(&db)?;
    fs::write(path, export::to_sync_json(log.records())?)?;
    info!("Wrote {} sync rows to {}", log.len(), path.display());
    Ok(())
}

fn run_import_json(config: &AppConfig, path: &Path) -> CliResult {
    let db = open_db(config)?;
    let mut log = load_log(&db)?;

    let report = persist::records_from_json(&fs::read_to_string(path)?)?;
    for skipped in &report.skipped {
        warn!("{}", skipped);
    }

    let mut imported = 0;
    for record in report.log.records() {
        match log.append(record.clone()) {
            Ok(()) => {
                db.insert_record(record)?;
                imported += 1;
            }
            Err(e) => warn!("Not importing: {}", e),
        }
    }
    info!(
        "Imported {} records from {} ({} skipped)",
        imported,
        path.display(),
        report.skipped.len() + report.log.len() - imported
    );
    Ok(())
}

fn run_set_duplicates(config: &AppConfig, policy: DuplicateHandling) -> CliResult {
    let db = open_db(config)?;
    db.set_duplicate_handling(policy)?;
    info!("Duplicate handling saved as '{}'", policy);
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
