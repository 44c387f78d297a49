// Start list JSON API
// Entry management and the preview UI talk to the engine through these types.

use crate::draw::{class_seed, draw_class_seeded, ClassDrawInput, ClassDrawResult};
use crate::entry::{normalize, RawEntry};
use crate::error::{DrawError, Result};
use crate::options::{DrawOptions, ShortfallPolicy};
use crate::policy::DrawPolicy;
use crate::stats::{compute_stats, DrawStats};
use crate::timeline::next_first_start;
use crate::SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

// ========== Request/Response Structures ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartListRequest {
    pub schema_version: u8,
    pub seed: u64,
    /// When set, every class after the first starts this many intervals
    /// after the previous class's last starter.
    #[serde(default)]
    pub chain_gap: Option<i64>,
    pub classes: Vec<ClassRequest>,
}

/// Numbers are signed so that negative values reach validation and get
/// reported by field name instead of failing as a parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRequest {
    pub class_id: String,
    pub policy: String,
    #[serde(default)]
    pub klung_size: Option<i64>,
    pub first_start: DateTime<Utc>,
    pub interval_secs: i64,
    #[serde(default)]
    pub vacancies: i64,
    #[serde(default = "default_club_separation")]
    pub club_separation: bool,
    #[serde(default = "default_min_club_separation")]
    pub min_club_separation: i64,
    #[serde(default)]
    pub repair_window: Option<i64>,
    #[serde(default)]
    pub shortfall: ShortfallPolicy,
    pub entries: Vec<RawEntry>,
}

fn default_club_separation() -> bool {
    true
}

fn default_min_club_separation() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDrawResponse {
    pub result: ClassDrawResult,
    pub stats: DrawStats,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartListResponse {
    pub schema_version: u8,
    pub success: bool,
    pub classes: BTreeMap<String, ClassDrawResponse>,
    pub error: Option<String>,
    /// Offending input field for validation failures.
    pub error_field: Option<String>,
}

impl StartListResponse {
    fn failure(err: &DrawError) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            success: false,
            classes: BTreeMap::new(),
            error: Some(err.to_string()),
            error_field: err.field().map(str::to_string),
        }
    }
}

// ========== Conversion ==========

fn non_negative(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| DrawError::invalid(field, format!("must not be negative, got {}", value)))
}

impl ClassRequest {
    /// Normalizes entries and checks every field. Does not draw.
    pub fn to_input(&self) -> Result<ClassDrawInput> {
        let klung_size = match self.klung_size {
            Some(size) => Some(non_negative(size, "klung_size")? as usize),
            None => None,
        };
        let policy = DrawPolicy::parse(&self.policy, klung_size)?;

        let vacancies = non_negative(self.vacancies, "vacancies")?;
        let vacancies = u32::try_from(vacancies)
            .map_err(|_| DrawError::invalid("vacancies", "too many vacancies"))?;
        let min_club_separation = non_negative(self.min_club_separation, "min_club_separation")?;
        let repair_window = match self.repair_window {
            Some(w) => Some(non_negative(w, "repair_window")? as usize),
            None => None,
        };

        let mut options = DrawOptions::new(self.first_start, self.interval_secs)
            .with_vacancies(vacancies)
            .with_shortfall(self.shortfall);
        options.club_separation = self.club_separation;
        options.min_club_separation = min_club_separation as usize;
        options.repair_window = repair_window;

        policy.validate()?;
        let entries = normalize(&self.entries)?;
        if policy.is_interval_based() {
            options.validate_for(entries.len())?;
        } else {
            options.validate()?;
        }

        Ok(ClassDrawInput { entries, policy, options })
    }
}

fn in_class(class_id: &str, err: DrawError) -> DrawError {
    match err {
        DrawError::InvalidInput { field, reason } => {
            DrawError::InvalidInput { field: format!("classes[{}].{}", class_id, field), reason }
        }
        other => other,
    }
}

// ========== Public API Functions ==========

/// Draws every class of the request, in request order.
pub fn draw_start_list(request: &StartListRequest) -> Result<BTreeMap<String, ClassDrawResponse>> {
    if request.schema_version != SCHEMA_VERSION {
        return Err(DrawError::invalid(
            "schema_version",
            format!("expected {}, got {}", SCHEMA_VERSION, request.schema_version),
        ));
    }
    let chain_gap = match request.chain_gap {
        Some(gap) => Some(
            u32::try_from(non_negative(gap, "chain_gap")?)
                .map_err(|_| DrawError::invalid("chain_gap", "gap too large"))?,
        ),
        None => None,
    };

    // Validate the whole request before drawing anything.
    let mut seen = HashSet::new();
    let mut inputs = Vec::with_capacity(request.classes.len());
    for class in &request.classes {
        if !seen.insert(class.class_id.as_str()) {
            return Err(DrawError::invalid(
                "classes.class_id",
                format!("duplicate class id '{}'", class.class_id),
            ));
        }
        let input = class.to_input().map_err(|e| in_class(&class.class_id, e))?;
        inputs.push((class.class_id.clone(), input));
    }

    let mut responses = BTreeMap::new();
    let mut previous: Option<(ClassDrawResult, DrawOptions)> = None;

    for (class_id, mut input) in inputs {
        if let (Some(gap), Some((prev, prev_options))) = (chain_gap, previous.as_ref()) {
            if let Some(start) = next_first_start(&prev.assignments, prev_options.interval, gap)
                .map_err(|e| in_class(&class_id, e))?
            {
                input.options.first_start = start;
            }
        }

        let result = draw_class_seeded(
            &input.entries,
            &input.policy,
            &input.options,
            class_seed(request.seed, &class_id),
        )
        .map_err(|e| in_class(&class_id, e))?;

        let stats = compute_stats(&result, &input.entries);
        if stats.unresolved_violations > 0 {
            warn!(class = %class_id, violations = stats.unresolved_violations, "class drawn with club separation shortfall");
        }
        let fingerprint = result.fingerprint();
        previous = Some((result.clone(), input.options));
        responses.insert(class_id, ClassDrawResponse { result, stats, fingerprint });
    }

    info!(classes = responses.len(), seed = request.seed, "start list drawn");
    Ok(responses)
}

/// JSON in, JSON out. Failures come back as `success: false` with a message.
pub fn draw_start_list_json(request_json: &str) -> String {
    let response = match serde_json::from_str::<StartListRequest>(request_json) {
        Ok(request) => match draw_start_list(&request) {
            Ok(classes) => StartListResponse {
                schema_version: SCHEMA_VERSION,
                success: true,
                classes,
                error: None,
                error_field: None,
            },
            Err(e) => StartListResponse::failure(&e),
        },
        Err(e) => StartListResponse::failure(&DrawError::from(e)),
    };

    serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"success":false,"error":"Serialization failed"}"#.to_string())
}
