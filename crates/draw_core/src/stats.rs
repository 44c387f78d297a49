//! Read-only summary of a finished class draw.

use crate::draw::ClassDrawResult;
use crate::entry::{distinct_clubs, Entry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawStats {
    pub total_entries: usize,
    pub club_count: usize,
    pub first_start: Option<DateTime<Utc>>,
    pub last_start: Option<DateTime<Utc>>,
    /// Smallest slot distance between two starters of one club, measured on
    /// the final start list. `None` when no club has two starters.
    pub min_club_separation_achieved: Option<usize>,
    /// Mean distance between consecutive starters of one club.
    pub avg_club_separation: Option<f64>,
    pub vacancies: usize,
    pub unresolved_violations: usize,
}

impl DrawStats {
    /// True when every same-club pair is at least `min_slots` apart.
    pub fn satisfies_separation(&self, min_slots: usize) -> bool {
        self.min_club_separation_achieved.map_or(true, |achieved| achieved >= min_slots)
    }
}

pub fn compute_stats(result: &ClassDrawResult, entries: &[Entry]) -> DrawStats {
    let assignments = &result.assignments;
    let club_of: HashMap<&str, &str> = entries
        .iter()
        .filter(|e| e.has_club())
        .map(|e| (e.id.as_str(), e.club.as_str()))
        .collect();

    let mut slots_by_club: HashMap<&str, Vec<usize>> = HashMap::new();
    for a in assignments {
        if let Some(club) = club_of.get(a.entry_id.as_str()) {
            slots_by_club.entry(*club).or_default().push(a.start_slot);
        }
    }

    let mut gaps = Vec::new();
    for slots in slots_by_club.values_mut() {
        slots.sort_unstable();
        gaps.extend(slots.windows(2).map(|w| w[1] - w[0]));
    }

    let avg_club_separation = if gaps.is_empty() {
        None
    } else {
        Some(gaps.iter().sum::<usize>() as f64 / gaps.len() as f64)
    };

    DrawStats {
        total_entries: assignments.len(),
        club_count: distinct_clubs(entries).len(),
        first_start: assignments.iter().map(|a| a.start_time).min(),
        last_start: assignments.iter().map(|a| a.start_time).max(),
        min_club_separation_achieved: gaps.iter().copied().min(),
        avg_club_separation,
        vacancies: result.vacant_slots.len(),
        unresolved_violations: result.violations.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::entries_from_clubs;
    use crate::policy::DrawPolicy;
    use crate::timeline::StartAssignment;
    use chrono::TimeZone;

    fn assignment(id: &str, slot: usize) -> StartAssignment {
        StartAssignment {
            entry_id: id.to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 5, 16, 10, 0, 0).unwrap()
                + chrono::Duration::minutes(slot as i64),
            slot_index: slot,
            start_slot: slot,
            group: slot,
        }
    }

    fn result(assignments: Vec<StartAssignment>) -> ClassDrawResult {
        ClassDrawResult {
            policy: DrawPolicy::Random,
            assignments,
            vacant_slots: vec![],
            violations: vec![],
        }
    }

    #[test]
    fn test_stats_from_assignment() {
        // Clubs: 1=A 2=A 3=A 4=B 5=B 6=C
        let entries = entries_from_clubs(&["A", "A", "A", "B", "B", "C"]);
        let r = result(vec![
            assignment("1", 0),
            assignment("4", 1),
            assignment("2", 2),
            assignment("6", 3),
            assignment("5", 4),
            assignment("3", 5),
        ]);

        let stats = compute_stats(&r, &entries);

        assert_eq!(stats.total_entries, 6);
        assert_eq!(stats.club_count, 3);
        assert_eq!(stats.first_start, Some(Utc.with_ymd_and_hms(2026, 5, 16, 10, 0, 0).unwrap()));
        assert_eq!(stats.last_start, Some(Utc.with_ymd_and_hms(2026, 5, 16, 10, 5, 0).unwrap()));
        // A gaps 2 and 3, B gap 3.
        assert_eq!(stats.min_club_separation_achieved, Some(2));
        let avg = stats.avg_club_separation.unwrap();
        assert!((avg - 8.0 / 3.0).abs() < 1e-9);
        assert!(stats.satisfies_separation(2));
        assert!(!stats.satisfies_separation(3));
    }

    #[test]
    fn test_stats_without_repeated_clubs() {
        let entries = entries_from_clubs(&["A", "B", ""]);
        let r = result(vec![assignment("1", 0), assignment("2", 1), assignment("3", 2)]);
        let stats = compute_stats(&r, &entries);

        assert_eq!(stats.club_count, 2);
        assert_eq!(stats.min_club_separation_achieved, None);
        assert_eq!(stats.avg_club_separation, None);
        assert!(stats.satisfies_separation(10));
    }

    #[test]
    fn test_stats_empty_result() {
        let stats = compute_stats(&result(vec![]), &[]);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.first_start, None);
        assert_eq!(stats.last_start, None);
    }
}
