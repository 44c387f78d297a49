//! Draw policies.
//!
//! A policy turns the entries of one class into an ordered sequence of start
//! groups. Singleton groups mean one entry per start slot (Random, MeOS,
//! SOFT); Klungor produces fixed-size clumps and Mass a single group.
//!
//! Groups hold indices into the caller's entry slice, so policies never copy
//! or mutate entries.

mod buckets;
pub mod klungor;
pub mod mass;
pub mod meos;
pub mod random;
pub mod soft;

pub use klungor::KlungorDraw;
pub use mass::MassDraw;
pub use meos::MeosDraw;
pub use random::RandomDraw;
pub use soft::SoftDraw;

use crate::entry::Entry;
use crate::error::{DrawError, Result};
use crate::options::DrawOptions;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Common contract of every draw policy.
pub trait DrawStrategy {
    fn draw<R: Rng + ?Sized>(
        &self,
        entries: &[Entry],
        options: &DrawOptions,
        rng: &mut R,
    ) -> OrderedGroups;
}

/// Sequence of start groups, each a list of indices into the entry slice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderedGroups {
    groups: Vec<Vec<usize>>,
}

impl OrderedGroups {
    pub fn singletons(order: Vec<usize>) -> Self {
        Self { groups: order.into_iter().map(|i| vec![i]).collect() }
    }

    pub fn from_groups(groups: Vec<Vec<usize>>) -> Self {
        Self { groups: groups.into_iter().filter(|g| !g.is_empty()).collect() }
    }

    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_singleton(&self) -> bool {
        self.groups.iter().all(|g| g.len() == 1)
    }

    /// Entry indices in start order.
    pub fn flatten(&self) -> Vec<usize> {
        self.groups.iter().flatten().copied().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawPolicy {
    /// Uniform random permutation.
    Random,
    /// Randomized club-separated draw.
    Meos,
    /// Deterministic club bucketing.
    Soft,
    /// Clump start, `klung_size` entries per start slot.
    Klungor { klung_size: usize },
    /// Everyone at `first_start`.
    Mass,
}

impl DrawPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            DrawPolicy::Random => "random",
            DrawPolicy::Meos => "meos",
            DrawPolicy::Soft => "soft",
            DrawPolicy::Klungor { .. } => "klungor",
            DrawPolicy::Mass => "mass",
        }
    }

    /// Parses the short names used by the CLI and CSV files.
    pub fn parse(name: &str, klung_size: Option<usize>) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(DrawPolicy::Random),
            "meos" => Ok(DrawPolicy::Meos),
            "soft" => Ok(DrawPolicy::Soft),
            "klungor" | "klung" | "clump" => {
                let klung_size = klung_size.ok_or_else(|| {
                    DrawError::invalid("klung_size", "required for klungor policy")
                })?;
                Ok(DrawPolicy::Klungor { klung_size })
            }
            "mass" => Ok(DrawPolicy::Mass),
            other => Err(DrawError::invalid("policy", format!("unknown draw policy '{}'", other))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            DrawPolicy::Klungor { klung_size: 0 } => {
                Err(DrawError::invalid("klung_size", "must be at least 1"))
            }
            _ => Ok(()),
        }
    }

    /// Policies the club separation solver runs after.
    pub fn is_club_constrained(&self) -> bool {
        matches!(self, DrawPolicy::Meos | DrawPolicy::Soft)
    }

    /// Mass starts ignore interval and vacancies.
    pub fn is_interval_based(&self) -> bool {
        !matches!(self, DrawPolicy::Mass)
    }

    pub fn draw<R: Rng + ?Sized>(
        &self,
        entries: &[Entry],
        options: &DrawOptions,
        rng: &mut R,
    ) -> OrderedGroups {
        match *self {
            DrawPolicy::Random => RandomDraw.draw(entries, options, rng),
            DrawPolicy::Meos => MeosDraw.draw(entries, options, rng),
            DrawPolicy::Soft => SoftDraw.draw(entries, options, rng),
            DrawPolicy::Klungor { klung_size } => {
                KlungorDraw::new(klung_size).draw(entries, options, rng)
            }
            DrawPolicy::Mass => MassDraw.draw(entries, options, rng),
        }
    }
}

impl fmt::Display for DrawPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DrawPolicy::Klungor { klung_size } => write!(f, "klungor({})", klung_size),
            other => f.write_str(other.name()),
        }
    }
}
