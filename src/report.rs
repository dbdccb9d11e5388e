use crate::stats::Report;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sysinfo::{ProcessExt, System, SystemExt};

/// Process level figures, gathered outside the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    pub elapsed: Duration,
    /// Resident memory of this process in KiB, when the platform reports it.
    pub memory_kib: Option<u64>,
}

impl RunStats {
    pub fn capture(started: Instant) -> Self {
        Self {
            elapsed: started.elapsed(),
            memory_kib: process_memory_kib(),
        }
    }
}

fn process_memory_kib() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_process(pid);
    system.process(pid).map(|process| process.memory() / 1024)
}

fn format_time(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Render the report as the plain text printed at the end of a run.
pub fn render(report: &Report, run: &RunStats) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_report(&mut out, report, run);
    out
}

fn write_report(out: &mut String, report: &Report, run: &RunStats) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, " --- BLOCKS ---")?;
    writeln!(out, "Collected since:                {}", format_time(report.since))?;
    writeln!(out, "Total blocks found:             {}", report.block_count)?;
    writeln!(
        out,
        "Average block time:             {} seconds",
        report.average_block_time
    )?;
    writeln!(
        out,
        "Average transactions per block: {:.6}",
        report.average_tx_per_block
    )?;
    writeln!(out, "Longest generation times:")?;
    for entry in report.longest_blocks() {
        writeln!(
            out,
            "    {:>6}s {} {}",
            entry.generation_time,
            format_time(entry.block.time),
            entry.block.hash
        )?;
    }
    writeln!(out, "Shortest generation times:")?;
    for entry in report.shortest_blocks() {
        writeln!(
            out,
            "    {:>6}s {} {}",
            entry.generation_time,
            format_time(entry.block.time),
            entry.block.hash
        )?;
    }

    writeln!(out)?;
    writeln!(out, " --- TRANSACTIONS ---")?;
    writeln!(out, "Total transactions:         {}", report.tx_count)?;
    writeln!(
        out,
        "Organic transactions:       ~{} (assumes one coinbase per block)",
        report.organic_tx_count
    )?;
    writeln!(out, "Organic transaction value:  {}", report.organic_value)?;
    match report.largest_transaction() {
        Some(tx) => writeln!(out, "Largest transaction:        {} {}", tx.value, tx.txid)?,
        None => writeln!(out, "Largest transaction:        none")?,
    }
    writeln!(out, "Top 10 transactions:")?;
    for tx in report.top_transactions() {
        writeln!(out, "    {} {}", tx.value, tx.txid)?;
    }

    writeln!(out)?;
    writeln!(out, " --- STATISTICS ---")?;
    writeln!(out, "Runtime in seconds: {}", run.elapsed.as_secs())?;
    match run.memory_kib {
        Some(kib) => writeln!(out, "Resident memory:    {} KiB", kib)?,
        None => writeln!(out, "Resident memory:    unknown")?,
    }
    Ok(())
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    Ok(csv::Writer::from_writer(file))
}

/// Write `summary.csv`, `blocks.csv` and `transactions.csv` into `output_dir`.
pub fn write_csv(report: &Report, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let summary_path = output_dir.join("summary.csv");
    let mut wtr = create_writer(&summary_path)?;
    wtr.write_record([
        "Since",
        "Now",
        "Blocks",
        "Transactions",
        "Average Block Time (s)",
        "Average Tx Per Block",
        "Organic Transactions (approx)",
        "Organic Value",
    ])?;
    wtr.write_record([
        report.since.to_string(),
        report.now.to_string(),
        report.block_count.to_string(),
        report.tx_count.to_string(),
        report.average_block_time.to_string(),
        format!("{:.6}", report.average_tx_per_block),
        report.organic_tx_count.to_string(),
        report.organic_value.to_string(),
    ])?;
    wtr.flush()?;

    // Full generation time ranking for histogram analysis
    let blocks_path = output_dir.join("blocks.csv");
    let mut wtr = create_writer(&blocks_path)?;
    wtr.write_record(["Rank", "Height", "Hash", "Time", "Generation Time (s)"])?;
    for (rank, entry) in report.ranked_blocks.iter().enumerate() {
        wtr.write_record([
            (rank + 1).to_string(),
            entry.block.height.to_string(),
            entry.block.hash.clone(),
            entry.block.time.to_string(),
            entry.generation_time.to_string(),
        ])?;
    }
    wtr.flush()?;

    let transactions_path = output_dir.join("transactions.csv");
    let mut wtr = create_writer(&transactions_path)?;
    wtr.write_record(["Rank", "Txid", "Value", "Coinbase"])?;
    for (rank, tx) in report.ranked_transactions.iter().enumerate() {
        wtr.write_record([
            (rank + 1).to_string(),
            tx.txid.clone(),
            tx.value.to_string(),
            tx.coinbase.to_string(),
        ])?;
    }
    wtr.flush()?;

    info!("Report written to {}", output_dir.display());
    Ok(vec![summary_path, blocks_path, transactions_path])
}
