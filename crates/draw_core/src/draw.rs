//! Draw pipeline: validate, order, repair, lay out on the clock.

use crate::entry::{ensure_unique_ids, Entry};
use crate::error::{DrawError, Result};
use crate::options::{DrawOptions, ShortfallPolicy};
use crate::policy::{DrawPolicy, OrderedGroups};
use crate::separation::{ClubSeparationSolver, SeparationViolation};
use crate::timeline::{build_timeline, StartAssignment};
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub type ClassId = String;

/// Start list of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDrawResult {
    pub policy: DrawPolicy,
    /// In start order.
    pub assignments: Vec<StartAssignment>,
    pub vacant_slots: Vec<usize>,
    /// Club separation the solver could not repair.
    pub violations: Vec<SeparationViolation>,
}

impl ClassDrawResult {
    pub fn empty(policy: DrawPolicy) -> Self {
        Self { policy, assignments: Vec::new(), vacant_slots: Vec::new(), violations: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn first_start(&self) -> Option<DateTime<Utc>> {
        self.assignments.iter().map(|a| a.start_time).min()
    }

    pub fn last_start(&self) -> Option<DateTime<Utc>> {
        self.assignments.iter().map(|a| a.start_time).max()
    }

    pub fn assignment_for(&self, entry_id: &str) -> Option<&StartAssignment> {
        self.assignments.iter().find(|a| a.entry_id == entry_id)
    }

    pub fn has_shortfall(&self) -> bool {
        !self.violations.is_empty()
    }

    /// SHA-256 over the start list, hex encoded. Identical draws give
    /// identical fingerprints, so an official list can be traced to its seed.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.policy.to_string().as_bytes());
        for a in &self.assignments {
            hasher.update([0u8]);
            hasher.update(a.entry_id.as_bytes());
            hasher.update([0u8]);
            hasher.update(a.start_time.timestamp().to_le_bytes());
            hasher.update((a.slot_index as u64).to_le_bytes());
            hasher.update((a.group as u64).to_le_bytes());
        }
        for slot in &self.vacant_slots {
            hasher.update((*slot as u64).to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Everything needed to draw one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDrawInput {
    pub entries: Vec<Entry>,
    pub policy: DrawPolicy,
    pub options: DrawOptions,
}

fn validate(entries: &[Entry], policy: &DrawPolicy, options: &DrawOptions) -> Result<()> {
    ensure_unique_ids(entries)?;
    policy.validate()?;
    if policy.is_interval_based() {
        options.validate_for(entries.len())
    } else {
        options.validate()
    }
}

/// Draws one class with the caller's random source.
pub fn draw_class<R: Rng + ?Sized>(
    entries: &[Entry],
    policy: &DrawPolicy,
    options: &DrawOptions,
    rng: &mut R,
) -> Result<ClassDrawResult> {
    validate(entries, policy, options)?;

    if entries.is_empty() {
        debug!(policy = %policy, "empty class, nothing to draw");
        return Ok(ClassDrawResult::empty(*policy));
    }

    let mut groups = policy.draw(entries, options, rng);
    debug!(policy = %policy, groups = groups.len(), "policy ordering done");

    let mut violations = Vec::new();
    if policy.is_club_constrained() && options.club_separation {
        let solver = ClubSeparationSolver::from_options(options);
        let mut order = groups.flatten();
        violations = solver.repair(&mut order, entries);
        groups = OrderedGroups::singletons(order);
    }

    if !violations.is_empty() {
        let achieved = violations.iter().map(|v| v.actual_separation).min().unwrap_or(0);
        warn!(
            policy = %policy,
            violations = violations.len(),
            achieved,
            required = options.min_club_separation,
            "club separation not fully satisfied"
        );
        if options.shortfall == ShortfallPolicy::Reject {
            return Err(DrawError::ConstraintShortfall { violations: violations.len(), achieved });
        }
    }

    let timeline = build_timeline(&groups, entries, options, policy)?;
    info!(
        policy = %policy,
        entries = timeline.assignments.len(),
        vacancies = timeline.vacant_slots.len(),
        "class drawn"
    );

    Ok(ClassDrawResult {
        policy: *policy,
        assignments: timeline.assignments,
        vacant_slots: timeline.vacant_slots,
        violations,
    })
}

/// Draws one class from a seed with the ChaCha8 generator.
pub fn draw_class_seeded(
    entries: &[Entry],
    policy: &DrawPolicy,
    options: &DrawOptions,
    seed: u64,
) -> Result<ClassDrawResult> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    draw_class(entries, policy, options, &mut rng)
}

/// Seed of one class in a multi-class draw. Depends only on the draw seed
/// and the class id, so adding a class never changes another class's list.
pub fn class_seed(seed: u64, class_id: &str) -> u64 {
    let digest = Sha256::digest(class_id.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    seed ^ u64::from_le_bytes(head)
}

/// Draws every class. All classes are validated before the first one is drawn.
pub fn draw_classes(
    classes: &BTreeMap<ClassId, ClassDrawInput>,
    seed: u64,
) -> Result<BTreeMap<ClassId, ClassDrawResult>> {
    for (class_id, class) in classes {
        validate(&class.entries, &class.policy, &class.options).map_err(|e| match e {
            DrawError::InvalidInput { field, reason } => {
                DrawError::InvalidInput { field: format!("classes[{}].{}", class_id, field), reason }
            }
            other => other,
        })?;
    }

    let mut results = BTreeMap::new();
    for (class_id, class) in classes {
        debug!(class = %class_id, "drawing class");
        let result =
            draw_class_seeded(&class.entries, &class.policy, &class.options, class_seed(seed, class_id))?;
        results.insert(class_id.clone(), result);
    }
    Ok(results)
}
