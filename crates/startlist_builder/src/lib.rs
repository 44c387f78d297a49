//! Start List Builder Library
//!
//! Entry CSV → per-class draw → start list report (JSON) + printable CSV,
//! plus re-draw verification of a saved report.

pub mod entries_csv;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use draw_core::{
    class_seed, compute_stats, draw_class_seeded, next_first_start, normalize, ClassDrawResult,
    ClassId, DrawConfig, DrawOptions, DrawStats, Entry, RawEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub use entries_csv::{load_entries_csv, write_start_list_csv, ParseStats};

/// How to draw an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawPlan {
    pub config: DrawConfig,
    pub first_start: DateTime<Utc>,
    pub seed: u64,
    /// Run classes back to back on one start instead of in parallel.
    pub chain: bool,
}

/// One class of a drawn event, with everything needed to redraw it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReport {
    pub options: DrawOptions,
    pub entries: Vec<Entry>,
    pub result: ClassDrawResult,
    pub stats: DrawStats,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartListReport {
    pub seed: u64,
    /// RFC3339
    pub created_at: String,
    pub classes: BTreeMap<ClassId, ClassReport>,
}

impl StartListReport {
    pub fn total_entries(&self) -> usize {
        self.classes.values().map(|c| c.stats.total_entries).sum()
    }

    pub fn total_violations(&self) -> usize {
        self.classes.values().map(|c| c.stats.unresolved_violations).sum()
    }
}

/// Start of the class after `result`: past its last starter, any trailing
/// vacancies and `gap` empty intervals.
fn chained_start(
    result: &ClassDrawResult,
    options: &DrawOptions,
    gap: u32,
) -> Result<Option<DateTime<Utc>>> {
    let Some(last_slot) = result.assignments.iter().map(|a| a.start_slot).max() else {
        return Ok(None);
    };
    let trailing = result.vacant_slots.iter().filter(|&&v| v > last_slot).count() as u32;
    let steps = gap.saturating_add(1).saturating_add(trailing);
    Ok(next_first_start(&result.assignments, options.interval, steps)?)
}

/// Draws every class of the event.
///
/// All classes are normalized and validated before the first draw, so a bad
/// row in the last class never leaves a half-drawn report behind.
pub fn run_draw(
    classes: &BTreeMap<ClassId, Vec<RawEntry>>,
    plan: &DrawPlan,
) -> Result<StartListReport> {
    plan.config.validate().context("Invalid draw configuration")?;

    let mut normalized = BTreeMap::new();
    for (class_id, raw) in classes {
        let entries =
            normalize(raw).with_context(|| format!("Invalid entries in class {}", class_id))?;
        normalized.insert(class_id.clone(), entries);
    }

    let mut reports = BTreeMap::new();
    let mut next_start = plan.first_start;

    for (class_id, entries) in normalized {
        let first_start = if plan.chain { next_start } else { plan.first_start };
        let options = plan.config.to_options(first_start);

        let result = draw_class_seeded(
            &entries,
            &plan.config.policy,
            &options,
            class_seed(plan.seed, &class_id),
        )
        .with_context(|| format!("Failed to draw class {}", class_id))?;

        if plan.chain {
            if let Some(start) = chained_start(&result, &options, plan.config.class_gap)
                .with_context(|| format!("Cannot chain the class after {}", class_id))?
            {
                next_start = start;
            }
        }

        let stats = compute_stats(&result, &entries);
        if stats.unresolved_violations > 0 {
            warn!(
                class = %class_id,
                violations = stats.unresolved_violations,
                achieved = ?stats.min_club_separation_achieved,
                "club separation shortfall"
            );
        }
        info!(class = %class_id, entries = stats.total_entries, "class drawn");

        let fingerprint = result.fingerprint();
        reports.insert(class_id, ClassReport { options, entries, result, stats, fingerprint });
    }

    Ok(StartListReport {
        seed: plan.seed,
        created_at: Utc::now().to_rfc3339(),
        classes: reports,
    })
}

pub fn save_report(path: &Path, report: &StartListReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write report file: {}", path.display()))?;
    Ok(())
}

pub fn load_report(path: &Path) -> Result<StartListReport> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report file: {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse report JSON")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassVerification {
    pub class_id: ClassId,
    /// Stored fingerprint matches the stored start list.
    pub fingerprint_ok: bool,
    /// Drawing again from the report's seed gives the same start list.
    pub redraw_ok: bool,
}

impl ClassVerification {
    pub fn is_valid(&self) -> bool {
        self.fingerprint_ok && self.redraw_ok
    }
}

/// Checks that every class in `report` is untampered and reproducible.
pub fn verify_report(report: &StartListReport) -> Result<Vec<ClassVerification>> {
    let mut out = Vec::with_capacity(report.classes.len());
    for (class_id, class) in &report.classes {
        let fingerprint_ok = class.result.fingerprint() == class.fingerprint;
        let redrawn = draw_class_seeded(
            &class.entries,
            &class.result.policy,
            &class.options,
            class_seed(report.seed, class_id),
        )
        .with_context(|| format!("Failed to redraw class {}", class_id))?;
        let redraw_ok = redrawn.fingerprint() == class.fingerprint;

        out.push(ClassVerification { class_id: class_id.clone(), fingerprint_ok, redraw_ok });
    }
    Ok(out)
}
