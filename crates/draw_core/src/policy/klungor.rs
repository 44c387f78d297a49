use super::{DrawStrategy, OrderedGroups};
use crate::entry::Entry;
use crate::options::DrawOptions;
use rand::seq::SliceRandom;
use rand::Rng;

/// Clump start: consecutive groups of `size` entries sharing a start slot.
#[derive(Debug, Clone, Copy)]
pub struct KlungorDraw {
    size: usize,
}

impl KlungorDraw {
    /// Clumps of `size` entries, at least one.
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl DrawStrategy for KlungorDraw {
    fn draw<R: Rng + ?Sized>(
        &self,
        entries: &[Entry],
        _options: &DrawOptions,
        rng: &mut R,
    ) -> OrderedGroups {
        // One shuffle randomizes both group membership and group order while
        // keeping the short group last.
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.shuffle(rng);
        OrderedGroups::from_groups(order.chunks(self.size).map(<[usize]>::to_vec).collect())
    }
}
