use super::{DrawStrategy, OrderedGroups};
use crate::entry::Entry;
use crate::options::DrawOptions;
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform random permutation, club blind.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDraw;

impl DrawStrategy for RandomDraw {
    fn draw<R: Rng + ?Sized>(
        &self,
        entries: &[Entry],
        _options: &DrawOptions,
        rng: &mut R,
    ) -> OrderedGroups {
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.shuffle(rng);
        OrderedGroups::singletons(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::entries_from_clubs;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn options() -> DrawOptions {
        DrawOptions::new(Utc.with_ymd_and_hms(2026, 5, 16, 10, 0, 0).unwrap(), 60)
    }

    #[test]
    fn test_random_is_a_permutation() {
        let entries = entries_from_clubs(&["A"; 25]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let groups = RandomDraw.draw(&entries, &options(), &mut rng);

        assert!(groups.is_singleton());
        let mut order = groups.flatten();
        order.sort_unstable();
        assert_eq!(order, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_same_seed_same_order() {
        let entries = entries_from_clubs(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        let a = RandomDraw.draw(&entries, &options(), &mut ChaCha8Rng::seed_from_u64(7));
        let b = RandomDraw.draw(&entries, &options(), &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_seeds_differ() {
        let entries = entries_from_clubs(&["A"; 30]);
        let a = RandomDraw.draw(&entries, &options(), &mut ChaCha8Rng::seed_from_u64(1));
        let b = RandomDraw.draw(&entries, &options(), &mut ChaCha8Rng::seed_from_u64(2));
        assert_ne!(a, b, "30! permutations, two seeds should not collide");
    }
}
