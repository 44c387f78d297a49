//! Club separation solver.
//!
//! Best-effort local repair over a singleton start order: a slot scan with the
//! last placement of every club, swapping a too-close entry with the nearest
//! following entry that fits, within a bounded lookahead. Cost is
//! O(n * window) and the result only depends on the input order.

use crate::entry::{Entry, EntryId};
use crate::options::DrawOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Two same-club entries closer than the required minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeparationViolation {
    /// The earlier of the two entries.
    pub entry_a: EntryId,
    pub entry_b: EntryId,
    pub actual_separation: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClubSeparationSolver {
    min_separation: usize,
    window: usize,
}

/// Last (slot, entry index) per club seen so far in a scan.
struct ScanState<'a> {
    last: HashMap<&'a str, (usize, usize)>,
}

impl<'a> ScanState<'a> {
    fn new() -> Self {
        Self { last: HashMap::new() }
    }

    /// Previous same-club placement that is too close to `slot`.
    fn conflict(&self, entry: &Entry, slot: usize, min_separation: usize) -> Option<(usize, usize)> {
        if !entry.has_club() {
            return None;
        }
        self.last
            .get(entry.club.as_str())
            .copied()
            .filter(|(last_slot, _)| slot - last_slot < min_separation)
    }

    fn place(&mut self, entry: &'a Entry, slot: usize, entry_idx: usize) {
        if entry.has_club() {
            self.last.insert(entry.club.as_str(), (slot, entry_idx));
        }
    }
}

impl ClubSeparationSolver {
    pub fn new(min_separation: usize, window: usize) -> Self {
        Self { min_separation: min_separation.max(1), window }
    }

    pub fn from_options(options: &DrawOptions) -> Self {
        Self::new(options.min_club_separation, options.effective_repair_window())
    }

    pub fn min_separation(&self) -> usize {
        self.min_separation
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Repairs `order` in place and returns what could not be repaired.
    pub fn repair(&self, order: &mut [usize], entries: &[Entry]) -> Vec<SeparationViolation> {
        let mut state = ScanState::new();
        let mut violations = Vec::new();

        for slot in 0..order.len() {
            if state.conflict(&entries[order[slot]], slot, self.min_separation).is_some() {
                let horizon = (slot + self.window).min(order.len().saturating_sub(1));
                let swap_with = (slot + 1..=horizon).find(|&j| {
                    state.conflict(&entries[order[j]], slot, self.min_separation).is_none()
                });
                if let Some(j) = swap_with {
                    order.swap(slot, j);
                }
            }

            let entry_idx = order[slot];
            let entry = &entries[entry_idx];
            if let Some((last_slot, last_idx)) = state.conflict(entry, slot, self.min_separation) {
                violations.push(SeparationViolation {
                    entry_a: entries[last_idx].id.clone(),
                    entry_b: entry.id.clone(),
                    actual_separation: slot - last_slot,
                });
            }
            state.place(entry, slot, entry_idx);
        }

        violations
    }

    /// Reports violations without touching the order.
    pub fn verify(&self, order: &[usize], entries: &[Entry]) -> Vec<SeparationViolation> {
        let mut state = ScanState::new();
        let mut violations = Vec::new();

        for (slot, &entry_idx) in order.iter().enumerate() {
            let entry = &entries[entry_idx];
            if let Some((last_slot, last_idx)) = state.conflict(entry, slot, self.min_separation) {
                violations.push(SeparationViolation {
                    entry_a: entries[last_idx].id.clone(),
                    entry_b: entry.id.clone(),
                    actual_separation: slot - last_slot,
                });
            }
            state.place(entry, slot, entry_idx);
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::{entries_from_clubs, min_same_club_distance};

    #[test]
    fn test_repair_swaps_forward() {
        let entries = entries_from_clubs(&["A", "A", "B", "C"]);
        let mut order = vec![0, 1, 2, 3];

        let violations = ClubSeparationSolver::new(2, 4).repair(&mut order, &entries);

        assert!(violations.is_empty());
        assert_eq!(order, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_repair_reports_unfixable() {
        let entries = entries_from_clubs(&["A", "A", "A", "B"]);
        let mut order = vec![0, 1, 2, 3];

        let violations = ClubSeparationSolver::new(2, 4).repair(&mut order, &entries);

        assert_eq!(order, vec![0, 3, 2, 1]);
        assert_eq!(
            violations,
            vec![SeparationViolation {
                entry_a: "3".to_string(),
                entry_b: "2".to_string(),
                actual_separation: 1,
            }]
        );
    }

    #[test]
    fn test_repair_respects_window() {
        let entries = entries_from_clubs(&["A", "A", "A", "B"]);
        let mut order = vec![0, 1, 2, 3];

        let violations = ClubSeparationSolver::new(2, 1).repair(&mut order, &entries);

        // B sits two slots ahead, outside a window of one.
        assert_eq!(order[1], 1);
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_verify_does_not_modify() {
        let entries = entries_from_clubs(&["A", "B", "A", "A"]);
        let order = vec![0, 1, 2, 3];
        let violations = ClubSeparationSolver::new(2, 4).verify(&order, &entries);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].entry_a, "3");
        assert_eq!(violations[0].entry_b, "4");
    }

    #[test]
    fn test_clubless_entries_never_violate() {
        let entries = entries_from_clubs(&["", "", "", ""]);
        let mut order = vec![0, 1, 2, 3];
        assert!(ClubSeparationSolver::new(3, 6).repair(&mut order, &entries).is_empty());
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_repair_of_club_blocks() {
        // Registration order puts every club in a block.
        let clubs = ["A", "A", "B", "B", "C", "C", "D", "D"];
        let entries = entries_from_clubs(&clubs);
        let mut order: Vec<usize> = (0..clubs.len()).collect();

        let violations = ClubSeparationSolver::new(2, 4).repair(&mut order, &entries);

        assert!(violations.is_empty(), "{:?}", violations);
        assert_eq!(order, vec![0, 2, 1, 3, 4, 6, 5, 7]);
        assert!(min_same_club_distance(&entries, &order).unwrap() >= 2);
    }
}
