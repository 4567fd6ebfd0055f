//! Plan tier and quota period types.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Subscription level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free tier, capped monthly transaction count.
    #[default]
    Free,
    /// Paid tier with a time-bounded entitlement.
    Premium,
    /// Manually granted tier; unlimited and never expires.
    Master,
}

impl PlanTier {
    /// Returns the persisted name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Master => "master",
        }
    }

    /// Returns true if the tier has no monthly transaction cap.
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Premium | Self::Master)
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            "master" => Ok(Self::Master),
            _ => Err(format!("Unknown plan tier: {s}")),
        }
    }
}

/// A (month, year) quota window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Calendar month, 1-12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
}

impl Period {
    /// Creates a period. Returns `None` if `month` is outside 1-12.
    #[must_use]
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month, year })
    }

    /// Returns the period that contains `instant` on the wall clock of `tz`.
    #[must_use]
    pub fn containing(instant: DateTime<Utc>, tz: Tz) -> Self {
        let local = instant.with_timezone(&tz);
        Self {
            month: local.month(),
            year: local.year(),
        }
    }

    /// Returns the period after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                month: 1,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                year: self.year,
            }
        }
    }

    /// Half-open UTC range `[start, end)` covered by this period on the wall
    /// clock of `tz`.
    #[must_use]
    pub fn bounds(self, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let next = self.next();
        let start = local_month_start(tz, self.year, self.month)?;
        let end = local_month_start(tz, next.year, next.month)?;
        Some((start, end))
    }
}

/// First instant of a month in `tz`. Midnight may not exist on DST
/// transition days, in which case the first valid hour is used.
fn local_month_start(tz: Tz, year: i32, month: u32) -> Option<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|start| start.with_timezone(&Utc))
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
