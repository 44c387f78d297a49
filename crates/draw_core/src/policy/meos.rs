use super::buckets::{bucket_by_club, interleave};
use super::{DrawStrategy, OrderedGroups, RandomDraw};
use crate::entry::Entry;
use crate::options::DrawOptions;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Randomized club-separated draw.
///
/// Clubs are bucketed, each bucket and the bucket order are shuffled, then
/// the buckets are interleaved so that no club repeats within
/// `min_club_separation` slots wherever the field allows it. Fields that
/// cannot be fully separated still produce a complete order; the club
/// separation solver reports what is left.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeosDraw;

impl DrawStrategy for MeosDraw {
    fn draw<R: Rng + ?Sized>(
        &self,
        entries: &[Entry],
        options: &DrawOptions,
        rng: &mut R,
    ) -> OrderedGroups {
        if !options.club_separation {
            return RandomDraw.draw(entries, options, rng);
        }

        let mut buckets = bucket_by_club(entries);
        for bucket in buckets.iter_mut() {
            bucket.members.make_contiguous().shuffle(rng);
        }
        buckets.shuffle(rng);

        debug!(
            entries = entries.len(),
            clubs = buckets.len(),
            min_separation = options.min_club_separation,
            "meos interleave"
        );

        OrderedGroups::singletons(interleave(buckets, options.min_club_separation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::{entries_from_clubs, min_same_club_distance};
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn options(min_sep: usize) -> DrawOptions {
        DrawOptions::new(Utc.with_ymd_and_hms(2026, 5, 16, 10, 0, 0).unwrap(), 60)
            .with_club_separation(min_sep)
    }

    #[test]
    fn test_meos_separates_example_field() {
        let entries = entries_from_clubs(&["A", "A", "A", "B", "B", "C"]);
        for seed in 0..50 {
            let order =
                MeosDraw.draw(&entries, &options(2), &mut ChaCha8Rng::seed_from_u64(seed)).flatten();
            assert_eq!(order.len(), 6);
            assert!(
                min_same_club_distance(&entries, &order).unwrap() >= 2,
                "seed {} gave {:?}",
                seed,
                order
            );
        }
    }

    #[test]
    fn test_meos_randomizes_within_club() {
        let entries = entries_from_clubs(&["A", "A", "A", "A", "B", "B", "B", "B"]);
        let firsts: std::collections::HashSet<usize> = (0..40)
            .map(|seed| {
                MeosDraw.draw(&entries, &options(2), &mut ChaCha8Rng::seed_from_u64(seed)).flatten()
                    [0]
            })
            .collect();
        assert!(firsts.len() > 2, "first starter should vary across seeds");
    }

    #[test]
    fn test_meos_without_separation_is_plain_random() {
        let entries = entries_from_clubs(&["A", "A", "B", "C", "C"]);
        let opts = options(2).without_club_separation();
        let meos = MeosDraw.draw(&entries, &opts, &mut ChaCha8Rng::seed_from_u64(5));
        let random = RandomDraw.draw(&entries, &opts, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(meos, random);
    }

    #[test]
    fn test_meos_overconstrained_still_complete() {
        let entries = entries_from_clubs(&["A", "A", "A", "A", "A", "B"]);
        let order =
            MeosDraw.draw(&entries, &options(3), &mut ChaCha8Rng::seed_from_u64(11)).flatten();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..6).collect::<Vec<_>>());
    }
}
