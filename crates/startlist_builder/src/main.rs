//! Start List Builder CLI
//!
//! Entry CSV → drawn start list (CSV + JSON report)
//! Saved report → stats / re-draw verification

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "startlist_builder")]
#[command(about = "Draw orienteering start lists from entry files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Draw every class in an entry CSV
    Draw {
        /// Input CSV (class,id,name,club,status)
        #[arg(long)]
        entries: PathBuf,

        /// Output start list CSV
        #[arg(long)]
        out: PathBuf,

        /// Output JSON report (needed for `verify`)
        #[arg(long)]
        report: Option<PathBuf>,

        /// First start, RFC3339 (e.g. 2026-05-16T10:00:00Z)
        #[arg(long)]
        first_start: String,

        /// Seed of the draw; record it for the jury
        #[arg(long)]
        seed: u64,

        /// Draw config JSON; falls back to DRAW_CONFIG_PATH, then the individual preset
        #[arg(long)]
        config: Option<PathBuf>,

        /// Policy override: random, meos, soft, klungor, mass
        #[arg(long)]
        policy: Option<String>,

        /// Group size for klungor
        #[arg(long)]
        klung_size: Option<usize>,

        /// Start interval override in seconds
        #[arg(long)]
        interval: Option<i64>,

        /// Vacant slots per class
        #[arg(long)]
        vacancies: Option<u32>,

        /// Minimum slots between two starters of one club
        #[arg(long)]
        min_separation: Option<usize>,

        /// Run classes back to back on one start
        #[arg(long, default_value = "false")]
        chain: bool,
    },

    /// Print statistics of a saved report
    Stats {
        #[arg(long)]
        report: PathBuf,
    },

    /// Check fingerprints and redraw every class of a saved report
    Verify {
        #[arg(long)]
        report: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("startlist_builder=info".parse()?)
                .add_directive("draw_core=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Draw {
            entries,
            out,
            report,
            first_start,
            seed,
            config,
            policy,
            klung_size,
            interval,
            vacancies,
            min_separation,
            chain,
        } => {
            let mut config = load_config(config)?;
            if let Some(policy) = policy {
                config.policy = draw_core::DrawPolicy::parse(&policy, klung_size)?;
            }
            if let Some(interval) = interval {
                config.interval_secs = interval;
            }
            if let Some(vacancies) = vacancies {
                config.vacancies = vacancies;
            }
            if let Some(min_separation) = min_separation {
                config.club_separation = true;
                config.min_club_separation = min_separation;
            }

            let first_start = chrono::DateTime::parse_from_rfc3339(&first_start)
                .with_context(|| format!("Invalid --first-start '{}'", first_start))?
                .with_timezone(&chrono::Utc);

            println!("Drawing start list...");
            println!("   Entries: {}", entries.display());
            println!("   Policy:  {}", config.policy);
            println!("   Seed:    {}", seed);

            let (classes, parse_stats) = startlist_builder::load_entries_csv(&entries)?;
            println!(
                "   Rows:    {} imported, {} not starting, {} skipped",
                parse_stats.imported, parse_stats.not_starting, parse_stats.failed
            );

            let plan = startlist_builder::DrawPlan { config, first_start, seed, chain };
            let drawn = startlist_builder::run_draw(&classes, &plan)?;

            startlist_builder::write_start_list_csv(&out, &drawn)?;
            println!("\nStart list written to: {}", out.display());

            if let Some(report_path) = report {
                startlist_builder::save_report(&report_path, &drawn)?;
                println!("Report saved to: {}", report_path.display());
            }

            print_report(&drawn);
        }

        Commands::Stats { report } => {
            let drawn = startlist_builder::load_report(&report)?;
            print_report(&drawn);
        }

        Commands::Verify { report } => {
            let drawn = startlist_builder::load_report(&report)?;
            println!("Verifying {} class(es) with seed {}...", drawn.classes.len(), drawn.seed);

            let checks = startlist_builder::verify_report(&drawn)?;
            let mut failed = 0;
            for check in &checks {
                let mark = if check.is_valid() { "ok" } else { "FAILED" };
                println!(
                    "   {:<10} {:<6} fingerprint={} redraw={}",
                    check.class_id, mark, check.fingerprint_ok, check.redraw_ok
                );
                if !check.is_valid() {
                    failed += 1;
                }
            }

            if failed > 0 {
                anyhow::bail!("{} class(es) failed verification", failed);
            }
            println!("All classes verified");
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn load_config(path: Option<PathBuf>) -> Result<draw_core::DrawConfig> {
    if let Some(path) = path {
        let path = path.to_string_lossy().to_string();
        return draw_core::DrawConfig::load(&path)
            .with_context(|| format!("Failed to load draw config {}", path));
    }
    Ok(draw_core::DrawConfig::load_from_env()
        .context("Failed to load draw config from DRAW_CONFIG_PATH")?
        .unwrap_or_default())
}

#[cfg(feature = "cli")]
fn print_report(report: &startlist_builder::StartListReport) {
    println!("\nClasses: {}  Starters: {}", report.classes.len(), report.total_entries());
    for (class_id, class) in &report.classes {
        let s = &class.stats;
        let first = s.first_start.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default();
        let last = s.last_start.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default();
        let separation = match (s.min_club_separation_achieved, s.avg_club_separation) {
            (Some(min), Some(avg)) => format!("club gap min {} avg {:.1}", min, avg),
            _ => "no repeated clubs".to_string(),
        };
        println!(
            "   {:<10} {:>4} starters {:>3} clubs  {}-{}  {}  vacancies {}",
            class_id, s.total_entries, s.club_count, first, last, separation, s.vacancies
        );
        if s.unresolved_violations > 0 {
            println!("      {} club separation violation(s):", s.unresolved_violations);
            for v in &class.result.violations {
                println!(
                    "        {} / {} only {} slot(s) apart",
                    v.entry_a, v.entry_b, v.actual_separation
                );
            }
        }
        println!("      fingerprint {}", class.fingerprint);
    }
    if report.total_violations() > 0 {
        println!("\nWarning: {} club separation violation(s) in total", report.total_violations());
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("startlist_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
