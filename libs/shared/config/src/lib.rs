use std::env;

use chrono::FixedOffset;
use tracing::warn;

/// All clinic slot arithmetic happens in a single fixed business timezone.
/// UTC+8 ("Singapore time") unless overridden through the environment.
pub const DEFAULT_CLINIC_UTC_OFFSET_MINUTES: i32 = 8 * 60;

/// How far ahead of "today" the booking calendar is scanned for free slots.
pub const DEFAULT_BOOKING_LOOKAHEAD_DAYS: i64 = 60;

#[derive(Debug, Clone)]
pub struct ClinicConfig {
    pub clinic_utc_offset_minutes: i32,
    pub booking_lookahead_days: i64,
}

impl ClinicConfig {
    pub fn from_env() -> Self {
        let clinic_utc_offset_minutes = env::var("CLINIC_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|raw| raw.parse::<i32>().ok())
            .unwrap_or_else(|| {
                warn!("CLINIC_UTC_OFFSET_MINUTES not set or invalid, using UTC+8 default");
                DEFAULT_CLINIC_UTC_OFFSET_MINUTES
            });

        let booking_lookahead_days = env::var("BOOKING_LOOKAHEAD_DAYS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or_else(|| {
                warn!("BOOKING_LOOKAHEAD_DAYS not set or invalid, using default");
                DEFAULT_BOOKING_LOOKAHEAD_DAYS
            });

        let config = Self {
            clinic_utc_offset_minutes,
            booking_lookahead_days,
        };

        if !config.is_configured() {
            warn!("Clinic configuration out of range, falling back to defaults where needed");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        FixedOffset::east_opt(self.clinic_utc_offset_minutes * 60).is_some()
            && self.booking_lookahead_days >= 0
    }

    /// The fixed offset every naive schedule time is interpreted in.
    /// An out-of-range configured offset falls back to UTC+8 rather than panicking.
    pub fn clinic_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.clinic_utc_offset_minutes * 60).unwrap_or_else(|| {
            warn!(
                "Configured clinic offset {} minutes is out of range, using UTC+8",
                self.clinic_utc_offset_minutes
            );
            FixedOffset::east_opt(DEFAULT_CLINIC_UTC_OFFSET_MINUTES * 60).unwrap()
        })
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            clinic_utc_offset_minutes: DEFAULT_CLINIC_UTC_OFFSET_MINUTES,
            booking_lookahead_days: DEFAULT_BOOKING_LOOKAHEAD_DAYS,
        }
    }
}
