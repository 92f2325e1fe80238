//! Command-line entry point: run the scheduler against a JSON snapshot,
//! print the run summary and, after confirmation, write the schedule back.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Duration;
use clap::Parser;

use bips::engine::Scheduler;
use bips::snapshot::{JsonScheduleStore, Snapshot};
use bips::SchedulerConfig;

/// Automatically schedule interviews for an admission round.
#[derive(Debug, Parser)]
#[command(name = "bips", version, about)]
struct Cli {
    /// Snapshot file with applications, slots and busy times.
    snapshot: PathBuf,

    /// Where to write the resulting assignments.
    #[arg(long, default_value = "schedule.json")]
    output: PathBuf,

    /// Seed for the load-balancing RNG.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Minutes of travel time between rooms.
    #[arg(long, default_value_t = 30)]
    travel_time: i64,

    /// Minutes an interviewer may work without a break.
    #[arg(long, default_value_t = 240)]
    max_continuous_work: i64,

    /// Minutes of gap that count as a break.
    #[arg(long, default_value_t = 20)]
    break_length: i64,

    /// Report interviewers with more interviews than this.
    #[arg(long, default_value_t = 10)]
    load_threshold: usize,

    /// Log per-applicant progress while scheduling.
    #[arg(long)]
    progress: bool,

    /// Save without asking.
    #[arg(long)]
    yes: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    run(Cli::parse())
}

fn run(cli: Cli) -> ExitCode {
    let config = SchedulerConfig {
        seed: cli.seed,
        travel_time: Duration::minutes(cli.travel_time),
        max_continuous_work: Duration::minutes(cli.max_continuous_work),
        break_length: Duration::minutes(cli.break_length),
        silent: !cli.progress,
    };

    let snapshot = match Snapshot::from_file(&cli.snapshot) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            eprintln!("invalid snapshot: {err}");
            return ExitCode::from(1);
        }
    };
    let mut scheduler = match Scheduler::new(snapshot, config) {
        Ok(scheduler) => scheduler,
        Err(err) => {
            eprintln!("invalid snapshot: {err}");
            return ExitCode::from(1);
        }
    };

    if let Err(err) = scheduler.schedule() {
        eprintln!("scheduling produced an invalid plan: {err}");
        return ExitCode::from(2);
    }

    print_report(&scheduler, cli.load_threshold);

    if !cli.yes && !confirm("Save interviews? (y/n) ") {
        println!("Didn't save interviews.");
        return ExitCode::SUCCESS;
    }

    let mut store = JsonScheduleStore::new(cli.output.clone());
    let saved = scheduler
        .save_scheduled_interviews(&mut store)
        .and_then(|()| store.flush());
    if let Err(err) = saved {
        eprintln!("could not save interviews: {err}");
        return ExitCode::from(1);
    }
    println!("Saved interviews to {}.", cli.output.display());
    ExitCode::SUCCESS
}

fn print_report(scheduler: &Scheduler, load_threshold: usize) {
    let report = scheduler.report(load_threshold);
    println!("Scheduled {} interviews.", report.interviews_scheduled);
    println!(
        "{} out of {} applicants got an interview.",
        report.applicants_allocated, report.applicants_total
    );
    println!(
        "{} interviews were missing an optional priority-1 interviewer.",
        report.interviews_missing_priority_1
    );
    if !report.busiest_interviewers.is_empty() {
        println!("Interviewers with more than {load_threshold} interviews:");
        for (interviewer, count) in &report.busiest_interviewers {
            let name = scheduler
                .snapshot()
                .interviewers
                .get(interviewer)
                .map(|i| i.name.as_str())
                .unwrap_or("(unknown)");
            println!("  {name}: {count}");
        }
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim() == "y"
}
