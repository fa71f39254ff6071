//! Per-market profile: timezone, session table, expected datapoints.

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::symbol::MarketKind;

/// A contiguous half-open trading interval `[start, end)` in market-local
/// time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Session {
    /// # Panics
    /// Panics if `start`/`end` are not valid `HH:MM` strings or if
    /// `start >= end` — this is only ever called with compile-time
    /// constants in [`MarketProfile::for_market`].
    #[must_use]
    pub fn new(start: &str, end: &str) -> Self {
        let start = NaiveTime::parse_from_str(start, "%H:%M").expect("valid start time");
        let end = NaiveTime::parse_from_str(end, "%H:%M").expect("valid end time");
        assert!(start < end, "session start must precede end");
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, t: NaiveTime) -> bool {
        t >= self.start && t < self.end
    }
}

/// Timezone + session table + expected-datapoint count for one market.
#[derive(Clone, Debug)]
pub struct MarketProfile {
    pub kind: MarketKind,
    pub timezone: Tz,
    pub sessions: Vec<Session>,
    pub expected_datapoints: u32,
}

impl MarketProfile {
    #[must_use]
    pub fn for_market(kind: MarketKind) -> Self {
        match kind {
            MarketKind::China => Self {
                kind,
                timezone: chrono_tz::Asia::Shanghai,
                sessions: vec![
                    Session::new("09:30", "11:30"),
                    Session::new("13:00", "15:00"),
                ],
                expected_datapoints: 240,
            },
            MarketKind::Us => Self {
                kind,
                timezone: chrono_tz::America::New_York,
                sessions: vec![Session::new("09:30", "16:00")],
                expected_datapoints: 390,
            },
            MarketKind::HongKong => Self {
                kind,
                timezone: chrono_tz::Asia::Hong_Kong,
                sessions: vec![
                    Session::new("09:30", "12:00"),
                    Session::new("13:00", "16:00"),
                ],
                expected_datapoints: 330,
            },
        }
    }

    /// First session of the day ("morning" in a multi-session market).
    #[must_use]
    pub fn morning(&self) -> Session {
        self.sessions[0]
    }

    /// Last session of the day; coincides with `morning()` for single-
    /// session markets (US).
    #[must_use]
    pub fn afternoon(&self) -> Session {
        *self.sessions.last().expect("at least one session")
    }

    #[must_use]
    pub fn is_multi_session(&self) -> bool {
        self.sessions.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::MarketProfile;
    use crate::symbol::MarketKind;

    #[test]
    fn expected_datapoints_match_spec() {
        assert_eq!(
            MarketProfile::for_market(MarketKind::China).expected_datapoints,
            240
        );
        assert_eq!(
            MarketProfile::for_market(MarketKind::Us).expected_datapoints,
            390
        );
        assert_eq!(
            MarketProfile::for_market(MarketKind::HongKong).expected_datapoints,
            330
        );
    }

    #[test]
    fn us_sessions_coincide() {
        let profile = MarketProfile::for_market(MarketKind::Us);
        assert!(!profile.is_multi_session());
        assert_eq!(profile.morning(), profile.afternoon());
    }
}
