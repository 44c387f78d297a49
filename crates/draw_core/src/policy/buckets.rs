use crate::entry::Entry;
use std::collections::{HashMap, VecDeque};

/// Entries of one club waiting to be placed.
#[derive(Debug)]
pub(crate) struct ClubBucket {
    pub club: String,
    pub members: VecDeque<usize>,
    last_slot: Option<usize>,
}

impl ClubBucket {
    fn remaining(&self) -> usize {
        self.members.len()
    }

    fn is_free_at(&self, slot: usize, min_separation: usize) -> bool {
        self.last_slot.map_or(true, |last| slot - last >= min_separation)
    }
}

/// Groups entry indices by club, clubs in first-registration order and
/// members in registration order. Club-less entries get a bucket each.
pub(crate) fn bucket_by_club(entries: &[Entry]) -> Vec<ClubBucket> {
    let mut buckets: Vec<ClubBucket> = Vec::new();
    let mut by_club: HashMap<&str, usize> = HashMap::new();

    for (idx, entry) in entries.iter().enumerate() {
        let slot = if entry.has_club() {
            *by_club.entry(entry.club.as_str()).or_insert_with(|| {
                buckets.push(ClubBucket {
                    club: entry.club.clone(),
                    members: VecDeque::new(),
                    last_slot: None,
                });
                buckets.len() - 1
            })
        } else {
            buckets.push(ClubBucket {
                club: entry.club.clone(),
                members: VecDeque::new(),
                last_slot: None,
            });
            buckets.len() - 1
        };
        buckets[slot].members.push_back(idx);
    }

    buckets
}

/// Greedy club interleave.
///
/// Each slot takes the club with the most entries left among clubs placed at
/// least `min_separation` slots ago. Ties go to the club placed longest ago,
/// then to bucket order. When no club is free the one placed longest ago is
/// used, so the result is always a full permutation.
pub(crate) fn interleave(mut buckets: Vec<ClubBucket>, min_separation: usize) -> Vec<usize> {
    let total: usize = buckets.iter().map(ClubBucket::remaining).sum();
    let mut order = Vec::with_capacity(total);

    for slot in 0..total {
        let free = buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.remaining() > 0 && b.is_free_at(slot, min_separation))
            .max_by(|(ia, a), (ib, b)| {
                a.remaining()
                    .cmp(&b.remaining())
                    .then_with(|| b.last_slot.cmp(&a.last_slot))
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(i, _)| i);

        let pick = free.or_else(|| {
            buckets
                .iter()
                .enumerate()
                .filter(|(_, b)| b.remaining() > 0)
                .min_by(|(ia, a), (ib, b)| {
                    a.last_slot
                        .cmp(&b.last_slot)
                        .then_with(|| b.remaining().cmp(&a.remaining()))
                        .then_with(|| ia.cmp(ib))
                })
                .map(|(i, _)| i)
        });

        let Some(bucket_idx) = pick else {
            break;
        };
        let bucket = &mut buckets[bucket_idx];
        if let Some(entry_idx) = bucket.members.pop_front() {
            order.push(entry_idx);
            bucket.last_slot = Some(slot);
        }
    }

    order
}
