//! # draw_core - Deterministic Start-List Draw Engine
//!
//! Assigns start times to the competitors of an orienteering class before
//! the race, with a JSON API for the entry and preview collaborators.
//!
//! ## Features
//! - Five draw policies: random, MeOS-style club separated, SOFT, klungor
//!   (clump start) and mass start
//! - Best-effort club separation repair with violation reporting
//! - Vacant slots spread through the start list
//! - 100% deterministic (same seed = same start list), with a SHA-256
//!   fingerprint per class for audit

pub mod api;
pub mod config;
pub mod draw;
pub mod entry;
pub mod error;
pub mod options;
pub mod policy;
pub mod separation;
pub mod stats;
pub mod timeline;

// Re-export main API functions
pub use api::{draw_start_list, draw_start_list_json, StartListRequest, StartListResponse};
pub use draw::{
    class_seed, draw_class, draw_class_seeded, draw_classes, ClassDrawInput, ClassDrawResult,
    ClassId,
};
pub use error::{DrawError, Result};

pub use config::{ConfigError, DrawConfig};
pub use entry::{normalize, Entry, EntryId, EntryStatus, RawEntry};
pub use options::{DrawOptions, ShortfallPolicy, MAX_VACANCIES};
pub use policy::{DrawPolicy, DrawStrategy, OrderedGroups};
pub use separation::{ClubSeparationSolver, SeparationViolation};
pub use stats::{compute_stats, DrawStats};
pub use timeline::{build_timeline, next_first_start, StartAssignment};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
