use super::buckets::{bucket_by_club, interleave};
use super::{DrawStrategy, OrderedGroups};
use crate::entry::Entry;
use crate::options::DrawOptions;
use rand::Rng;

/// Deterministic club bucketing: largest clubs first, ties by first
/// registration, members in registration order. Never consumes randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftDraw;

impl DrawStrategy for SoftDraw {
    fn draw<R: Rng + ?Sized>(
        &self,
        entries: &[Entry],
        options: &DrawOptions,
        _rng: &mut R,
    ) -> OrderedGroups {
        let mut buckets = bucket_by_club(entries);
        // Stable sort keeps registration order among equally large clubs.
        buckets.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
        OrderedGroups::singletons(interleave(buckets, options.effective_separation()))
    }
}
