//! Per-class draw options.

use crate::error::{DrawError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on vacant slots per class.
pub const MAX_VACANCIES: u32 = 1_000;

/// What to do when club separation cannot be fully satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Return the best-effort start list and report the violations.
    #[default]
    Degrade,
    /// Fail the class with `DrawError::ConstraintShortfall`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOptions {
    /// Start time of slot 0. For mass starts, the shared start time.
    pub first_start: DateTime<Utc>,
    /// Slot length, whole seconds.
    #[serde(rename = "interval_secs", with = "duration_secs")]
    pub interval: Duration,
    /// Empty slots spread through the start list.
    #[serde(default)]
    pub vacancies: u32,
    #[serde(default = "default_club_separation")]
    pub club_separation: bool,
    /// Minimum slot distance between two entries of one club.
    #[serde(default = "default_min_club_separation")]
    pub min_club_separation: usize,
    /// Lookahead for local repair swaps. `None` means twice the minimum separation.
    #[serde(default)]
    pub repair_window: Option<usize>,
    #[serde(default)]
    pub shortfall: ShortfallPolicy,
}

fn default_club_separation() -> bool {
    true
}

fn default_min_club_separation() -> usize {
    1
}

impl DrawOptions {
    pub fn new(first_start: DateTime<Utc>, interval_secs: i64) -> Self {
        Self {
            first_start,
            // Out of range seconds become an interval `validate` rejects.
            interval: Duration::try_seconds(interval_secs).unwrap_or(Duration::max_value()),
            vacancies: 0,
            club_separation: default_club_separation(),
            min_club_separation: default_min_club_separation(),
            repair_window: None,
            shortfall: ShortfallPolicy::Degrade,
        }
    }

    pub fn with_vacancies(mut self, vacancies: u32) -> Self {
        self.vacancies = vacancies;
        self
    }

    pub fn with_club_separation(mut self, min_slots: usize) -> Self {
        self.club_separation = true;
        self.min_club_separation = min_slots;
        self
    }

    pub fn without_club_separation(mut self) -> Self {
        self.club_separation = false;
        self
    }

    pub fn with_repair_window(mut self, window: usize) -> Self {
        self.repair_window = Some(window);
        self
    }

    pub fn with_shortfall(mut self, shortfall: ShortfallPolicy) -> Self {
        self.shortfall = shortfall;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval <= Duration::zero() {
            return Err(DrawError::invalid(
                "interval",
                format!("must be positive, got {}s", self.interval.num_seconds()),
            ));
        }
        // Range first; the clamped maximum is not whole seconds.
        self.start_time_at(1)?;
        if self.interval.subsec_nanos() != 0 {
            return Err(DrawError::invalid("interval", "must be a whole number of seconds"));
        }
        if self.min_club_separation == 0 {
            return Err(DrawError::invalid("min_club_separation", "must be at least 1"));
        }
        if self.vacancies > MAX_VACANCIES {
            return Err(DrawError::invalid(
                "vacancies",
                format!("at most {} per class, got {}", MAX_VACANCIES, self.vacancies),
            ));
        }
        Ok(())
    }

    /// `validate` plus a check that a class of `entry_count` starters and
    /// the vacancies fits on the clock.
    pub fn validate_for(&self, entry_count: usize) -> Result<()> {
        self.validate()?;
        self.start_time_at(entry_count.saturating_add(self.vacancies as usize))?;
        Ok(())
    }

    /// Separation the policies and the solver actually work with.
    pub fn effective_separation(&self) -> usize {
        if self.club_separation {
            self.min_club_separation
        } else {
            1
        }
    }

    pub fn effective_repair_window(&self) -> usize {
        self.repair_window.unwrap_or(2 * self.min_club_separation)
    }

    /// Clock value of a timeline slot.
    pub fn start_time_at(&self, slot: usize) -> Result<DateTime<Utc>> {
        i64::try_from(slot)
            .ok()
            .and_then(|slot| self.interval.num_seconds().checked_mul(slot))
            .and_then(Duration::try_seconds)
            .and_then(|offset| self.first_start.checked_add_signed(offset))
            .ok_or_else(|| {
                let secs = self.interval.num_seconds();
                DrawError::invalid(
                    "interval",
                    format!("slot {} at {}s intervals is out of the clock range", slot, secs),
                )
            })
    }
}

pub(crate) mod duration_secs {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(d)?;
        Duration::try_seconds(secs)
            .ok_or_else(|| D::Error::custom(format!("interval of {}s is out of range", secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ten_o_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 16, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_start_time_at() {
        let opts = DrawOptions::new(ten_o_clock(), 60);
        assert_eq!(opts.start_time_at(0).unwrap(), ten_o_clock());
        assert_eq!(
            opts.start_time_at(5).unwrap(),
            Utc.with_ymd_and_hms(2026, 5, 16, 10, 5, 0).unwrap()
        );
    }

    #[test]
    fn test_out_of_range_interval_rejected() {
        for secs in [1_000_000_000_000_000, i64::MAX] {
            let opts = DrawOptions::new(ten_o_clock(), secs);
            assert_eq!(opts.validate().unwrap_err().field(), Some("interval"), "{}s", secs);
            assert!(opts.start_time_at(3).is_err());
        }
    }

    #[test]
    fn test_validate_for_checks_last_slot() {
        // A year per slot reaches slot 1 but not slot 300_000.
        let opts = DrawOptions::new(ten_o_clock(), 365 * 24 * 3600);
        assert!(opts.validate().is_ok());
        assert!(opts.validate_for(10).is_ok());
        assert_eq!(opts.validate_for(300_000).unwrap_err().field(), Some("interval"));
    }

    #[test]
    fn test_validate_rejects_too_many_vacancies() {
        let opts = DrawOptions::new(ten_o_clock(), 60).with_vacancies(u32::MAX);
        assert_eq!(opts.validate().unwrap_err().field(), Some("vacancies"));
        assert!(DrawOptions::new(ten_o_clock(), 60).with_vacancies(MAX_VACANCIES).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_interval() {
        let err = DrawOptions::new(ten_o_clock(), 0).validate().unwrap_err();
        assert_eq!(err.field(), Some("interval"));

        let err = DrawOptions::new(ten_o_clock(), -30).validate().unwrap_err();
        assert_eq!(err.field(), Some("interval"));
    }

    #[test]
    fn test_validate_rejects_sub_second_interval() {
        let mut opts = DrawOptions::new(ten_o_clock(), 60);
        opts.interval = Duration::milliseconds(1500);
        assert_eq!(opts.validate().unwrap_err().field(), Some("interval"));
    }

    #[test]
    fn test_validate_rejects_zero_separation() {
        let opts = DrawOptions::new(ten_o_clock(), 60).with_club_separation(0);
        assert_eq!(opts.validate().unwrap_err().field(), Some("min_club_separation"));
    }

    #[test]
    fn test_repair_window_defaults_to_twice_separation() {
        let opts = DrawOptions::new(ten_o_clock(), 60).with_club_separation(3);
        assert_eq!(opts.effective_repair_window(), 6);
        assert_eq!(opts.clone().with_repair_window(2).effective_repair_window(), 2);
        assert_eq!(opts.without_club_separation().effective_separation(), 1);
    }

    #[test]
    fn test_serde_interval_as_seconds() {
        let opts = DrawOptions::new(ten_o_clock(), 120).with_vacancies(2);
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["interval_secs"], 120);
        assert_eq!(json["vacancies"], 2);

        let back: DrawOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, opts);
    }

    #[test]
    fn test_serde_rejects_out_of_range_interval() {
        let err = serde_json::from_str::<DrawOptions>(
            r#"{"first_start":"2026-05-16T10:00:00Z","interval_secs":9223372036854775807}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_serde_defaults() {
        let opts: DrawOptions = serde_json::from_str(
            r#"{"first_start":"2026-05-16T10:00:00Z","interval_secs":60}"#,
        )
        .unwrap();
        assert!(opts.club_separation);
        assert_eq!(opts.min_club_separation, 1);
        assert_eq!(opts.vacancies, 0);
        assert_eq!(opts.shortfall, ShortfallPolicy::Degrade);
    }
}
