//! Entry CSV import and start list CSV export
//!
//! Entry files carry one row per competitor:
//!
//! ```text
//! class,id,name,club,status
//! H21,1001,Anna Berg,OK Linné,
//! H21,1002,Bo Ek,IFK Lidingö,withdrawn
//! ```
//!
//! `status` may be empty (entered), `withdrawn` or `dns`.

use anyhow::{Context, Result};
use draw_core::{ClassId, EntryStatus, RawEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use crate::StartListReport;

#[derive(Debug, Deserialize)]
struct EntryRow {
    class: String,
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    club: String,
    #[serde(default)]
    status: String,
}

/// Import statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total_rows: usize,
    pub imported: usize,
    pub not_starting: usize,
    pub failed: usize,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reads an entry CSV into per-class raw entry lists, in file order.
///
/// Rows that cannot be read are counted in `ParseStats::failed` and skipped.
/// Withdrawn rows are kept so the entry pool can filter them.
pub fn load_entries_csv(
    csv_path: &Path,
) -> Result<(BTreeMap<ClassId, Vec<RawEntry>>, ParseStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

    let mut classes: BTreeMap<ClassId, Vec<RawEntry>> = BTreeMap::new();
    let mut stats = ParseStats::new();

    for (row_idx, record) in reader.deserialize::<EntryRow>().enumerate() {
        stats.total_rows += 1;
        // Header is line 1.
        let line = row_idx + 2;

        let row = match record {
            Ok(row) => row,
            Err(e) => {
                stats.failed += 1;
                warn!(line, error = %e, "skipping unreadable entry row");
                continue;
            }
        };

        if row.class.is_empty() || row.id.is_empty() {
            stats.failed += 1;
            warn!(line, "skipping entry row without class or id");
            continue;
        }

        let Some(status) = EntryStatus::parse(&row.status) else {
            stats.failed += 1;
            warn!(line, status = %row.status, "skipping entry row with unknown status");
            continue;
        };

        if status != EntryStatus::Entered {
            stats.not_starting += 1;
        }
        stats.imported += 1;
        classes
            .entry(row.class)
            .or_default()
            .push(RawEntry::new(row.id, row.club, row.name).with_status(status));
    }

    Ok((classes, stats))
}

#[derive(Debug, Serialize)]
struct StartListRow<'a> {
    class: &'a str,
    slot: usize,
    start_time: String,
    id: &'a str,
    name: &'a str,
    club: &'a str,
}

/// Writes a printable start list: one row per starter and per vacant slot,
/// classes in id order, rows in start order.
pub fn write_start_list_csv(path: &Path, report: &StartListReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    for (class_id, class) in &report.classes {
        let names: BTreeMap<&str, (&str, &str)> = class
            .entries
            .iter()
            .map(|e| (e.id.as_str(), (e.name.as_str(), e.club.as_str())))
            .collect();

        let mut rows: Vec<StartListRow> = class
            .result
            .assignments
            .iter()
            .map(|a| {
                let (name, club) = names.get(a.entry_id.as_str()).copied().unwrap_or(("", ""));
                StartListRow {
                    class: class_id,
                    slot: a.slot_index,
                    start_time: a.start_time.format("%H:%M:%S").to_string(),
                    id: &a.entry_id,
                    name,
                    club,
                }
            })
            .collect();

        for &slot in &class.result.vacant_slots {
            let start_time = class
                .options
                .start_time_at(slot)
                .with_context(|| format!("Vacant slot {} of class {}", slot, class_id))?;
            rows.push(StartListRow {
                class: class_id,
                slot,
                start_time: start_time.format("%H:%M:%S").to_string(),
                id: "",
                name: "VACANT",
                club: "",
            });
        }
        rows.sort_by_key(|r| r.slot);

        for row in rows {
            writer.serialize(row).context("Failed to write start list row")?;
        }
    }

    writer.flush().context("Failed to flush start list CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_entries_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "class,id,name,club,status").unwrap();
        writeln!(file, "H21,1,Anna,OK Linné,").unwrap();
        writeln!(file, "H21,2,Bo,IFK Lidingö,withdrawn").unwrap();
        writeln!(file, "D21,3,Cecilia,Järla,").unwrap();
        writeln!(file, "D21,4,David,Järla,sick").unwrap();
        writeln!(file, ",5,Nobody,,").unwrap();
        file.flush().unwrap();

        let (classes, stats) = load_entries_csv(file.path()).unwrap();

        assert_eq!(stats.total_rows, 5);
        assert_eq!(stats.imported, 3);
        assert_eq!(stats.not_starting, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(classes.len(), 2);
        assert_eq!(classes["H21"].len(), 2);
        assert_eq!(classes["H21"][1].status, EntryStatus::Withdrawn);
        assert_eq!(classes["D21"][0].club, "Järla");
    }

    #[test]
    fn test_missing_file() {
        let err = load_entries_csv(Path::new("/no/such/entries.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
