//! Slot timeline: turns ordered start groups into start times.

use crate::entry::{Entry, EntryId};
use crate::error::{DrawError, Result};
use crate::options::DrawOptions;
use crate::policy::{DrawPolicy, OrderedGroups};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAssignment {
    pub entry_id: EntryId,
    pub start_time: DateTime<Utc>,
    /// Distinct per entry. Equals `start_slot` for one-per-slot draws, so
    /// vacancies show up as gaps; running print order for clump and mass starts.
    pub slot_index: usize,
    /// Timeline slot whose clock value is `start_time`.
    pub start_slot: usize,
    /// Start group the entry belongs to.
    pub group: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    pub assignments: Vec<StartAssignment>,
    pub vacant_slots: Vec<usize>,
}

/// A vacancy follows every `step`-th group.
pub fn vacancy_step(groups: usize, vacancies: u32) -> Option<usize> {
    if vacancies == 0 {
        return None;
    }
    Some((groups / vacancies as usize).max(1))
}

pub fn build_timeline(
    groups: &OrderedGroups,
    entries: &[Entry],
    options: &DrawOptions,
    policy: &DrawPolicy,
) -> Result<Timeline> {
    if groups.is_empty() {
        return Ok(Timeline::default());
    }
    if !policy.is_interval_based() {
        return Ok(mass_timeline(groups, entries, options));
    }

    let vacancies = options.vacancies as usize;
    let step = vacancy_step(groups.len(), options.vacancies);
    let one_per_slot = groups.is_singleton();

    let mut assignments = Vec::with_capacity(groups.entry_count());
    let mut vacant_slots = Vec::with_capacity(vacancies.min(groups.len()));
    let mut slot = 0usize;

    for (group_idx, group) in groups.groups().iter().enumerate() {
        let start_time = options.start_time_at(slot)?;
        for &entry_idx in group {
            let slot_index = if one_per_slot { slot } else { assignments.len() };
            assignments.push(StartAssignment {
                entry_id: entries[entry_idx].id.clone(),
                start_time,
                slot_index,
                start_slot: slot,
                group: group_idx,
            });
        }
        slot += 1;

        if let Some(step) = step {
            if vacant_slots.len() < vacancies && (group_idx + 1) % step == 0 {
                vacant_slots.push(slot);
                slot += 1;
            }
        }
    }

    // More vacancies than groups: the rest go after the last starter.
    while vacant_slots.len() < vacancies {
        vacant_slots.push(slot);
        slot += 1;
    }

    Ok(Timeline { assignments, vacant_slots })
}

fn mass_timeline(groups: &OrderedGroups, entries: &[Entry], options: &DrawOptions) -> Timeline {
    let assignments = groups
        .groups()
        .iter()
        .enumerate()
        .flat_map(|(group_idx, group)| group.iter().map(move |&idx| (group_idx, idx)))
        .enumerate()
        .map(|(slot_index, (group_idx, entry_idx))| StartAssignment {
            entry_id: entries[entry_idx].id.clone(),
            start_time: options.first_start,
            slot_index,
            start_slot: 0,
            group: group_idx,
        })
        .collect();

    Timeline { assignments, vacant_slots: Vec::new() }
}

/// First start for a class drawn after this one, `gap` intervals after its
/// last starter. `Ok(None)` for an empty class.
pub fn next_first_start(
    assignments: &[StartAssignment],
    interval: Duration,
    gap: u32,
) -> Result<Option<DateTime<Utc>>> {
    let Some(last) = assignments.iter().map(|a| a.start_time).max() else {
        return Ok(None);
    };
    interval
        .num_seconds()
        .checked_mul(i64::from(gap))
        .and_then(Duration::try_seconds)
        .and_then(|offset| last.checked_add_signed(offset))
        .map(Some)
        .ok_or_else(|| {
            DrawError::invalid(
                "chain_gap",
                format!("{} intervals after {} is out of the clock range", gap, last),
            )
        })
}
