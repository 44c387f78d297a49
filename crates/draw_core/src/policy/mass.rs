use super::{DrawStrategy, OrderedGroups};
use crate::entry::Entry;
use crate::options::DrawOptions;
use rand::Rng;

/// Whole class in one group, listed in registration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MassDraw;

impl DrawStrategy for MassDraw {
    fn draw<R: Rng + ?Sized>(
        &self,
        entries: &[Entry],
        _options: &DrawOptions,
        _rng: &mut R,
    ) -> OrderedGroups {
        OrderedGroups::from_groups(vec![(0..entries.len()).collect()])
    }
}
