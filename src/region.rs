use crate::config::PeriodMode;
use crate::error::HarvestError;
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Country/territory anchoring a "case zero" timestamp.
/// Each region matches the subreddit of the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    HongKong,
    Singapore,
    NewZealand,
    Australia,
    Canada,
    UnitedKingdom,
    Ireland,
}

/// Reference timestamps (UTC epoch seconds) for one region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchors {
    pub month_before: i64,
    pub first_case: i64,
    pub month_after: i64,
}

/// Search window; `before` is exclusive upper bound, `after` the lower bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub before: i64,
    pub after: i64,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::HongKong,
        Region::Singapore,
        Region::NewZealand,
        Region::Australia,
        Region::Canada,
        Region::UnitedKingdom,
        Region::Ireland,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::HongKong => "hongkong",
            Region::Singapore => "singapore",
            Region::NewZealand => "newzealand",
            Region::Australia => "australia",
            Region::Canada => "canada",
            Region::UnitedKingdom => "unitedkingdom",
            Region::Ireland => "ireland",
        }
    }

    pub fn anchors(self) -> Anchors {
        let (month_before, first_case, month_after) = match self {
            Region::HongKong => (1576976400, 1579654800, 1582333200),
            Region::Singapore => (1577012400, 1579690800, 1582369200),
            Region::NewZealand => (1580122800, 1582801200, 1585306800),
            Region::Australia => (1577185200, 1579863600, 1582542000),
            Region::Canada => (1577185200, 1579863600, 1582542000),
            Region::UnitedKingdom => (1577703600, 1580382000, 1583060400),
            Region::Ireland => (1580259600, 1582938000, 1585443600),
        };
        Anchors { month_before, first_case, month_after }
    }

    /// Precovid covers [month_before, first_case]; postcovid covers [first_case, month_after].
    pub fn window(self, period: PeriodMode) -> TimeWindow {
        let a = self.anchors();
        match period {
            PeriodMode::Precovid => TimeWindow { before: a.first_case, after: a.month_before },
            PeriodMode::Postcovid => TimeWindow { before: a.month_after, after: a.first_case },
        }
    }

    /// Comma-separated list of known names, for error messages and `--list-regions`.
    pub fn known_names() -> String {
        Self::ALL.iter().map(|r| r.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = HarvestError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let key = key.strip_prefix("r/").unwrap_or(&key);
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.name() == key)
            .ok_or_else(|| HarvestError::UnknownRegion(s.trim().to_string()))
    }
}

impl TimeWindow {
    pub fn span_secs(&self) -> i64 {
        self.before - self.after
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", rfc3339(self.after), rfc3339(self.before))
    }
}

fn rfc3339(ts: i64) -> String {
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.to_string())
}
