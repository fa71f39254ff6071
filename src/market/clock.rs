//! Market clock: trading-state state machine and previous-trading-day walk.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::Config;
use crate::market::profile::MarketProfile;
use crate::symbol::{MarketKind, Symbol};

/// Pure function of `(now in market tz, market kind)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradingState {
    PreMarket,
    Live,
    PostMarket,
    Weekend,
    /// Holiday detection is explicitly deferred; this implementation never
    /// emits it.
    Holiday,
}

/// Resolves the effective `chrono_tz::Tz` for a market from config,
/// downgrading to a fixed local-time profile and logging a warning if the
/// configured IANA name fails to parse.
#[must_use]
pub fn resolve_timezone(config: &Config, kind: MarketKind) -> Tz {
    let configured = config.market(kind).timezone_name.as_str();
    match Tz::from_str(configured) {
        Ok(tz) => tz,
        Err(_) => {
            tracing::warn!(
                market = %kind,
                configured,
                "failed to load configured timezone, downgrading to market default"
            );
            MarketProfile::for_market(kind).timezone
        }
    }
}

/// `marketOf(symbol) -> MarketKind`.
#[must_use]
pub fn market_of(symbol: &Symbol) -> MarketKind {
    symbol.market()
}

/// `expectedDatapoints(market) -> int`.
#[must_use]
pub fn expected_datapoints(kind: MarketKind) -> u32 {
    MarketProfile::for_market(kind).expected_datapoints
}

/// `tradingState(now, market) -> TradingState`. `now` is an absolute
/// instant; it is converted into the market's local wall-clock time
/// before classification.
#[must_use]
pub fn trading_state(now: DateTime<Utc>, profile: &MarketProfile) -> TradingState {
    let local = now.with_timezone(&profile.timezone);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return TradingState::Weekend;
    }

    let t = local.time();
    let morning = profile.morning();
    let afternoon = profile.afternoon();

    if t < morning.start {
        return TradingState::PreMarket;
    }
    if morning.contains(t) || (profile.is_multi_session() && afternoon.contains(t)) {
        return TradingState::Live;
    }
    TradingState::PostMarket
}

/// `previousTradingDay(symbol, date) -> date`: walk back 1..=7 days in
/// market-local time, skipping Saturday/Sunday. `date` is `YYYYMMDD`.
/// Unparsable input is returned unchanged.
#[must_use]
pub fn previous_trading_day(symbol: &Symbol, date: &str) -> String {
    let Some(parsed) = parse_yyyymmdd(date) else {
        return date.to_string();
    };

    let kind = symbol.market();
    let profile = MarketProfile::for_market(kind);
    let local_midnight = profile
        .timezone
        .from_local_datetime(&parsed.and_hms_opt(0, 0, 0).expect("valid midnight"))
        .single()
        .unwrap_or_else(|| profile.timezone.from_utc_datetime(&parsed.and_hms_opt(0, 0, 0).expect("valid midnight")));

    for back in 1..=7 {
        let candidate = local_midnight - Duration::days(back);
        if !matches!(candidate.weekday(), Weekday::Sat | Weekday::Sun) {
            return format_yyyymmdd(candidate.date_naive());
        }
    }

    format_yyyymmdd(parsed - Duration::days(1))
}

fn parse_yyyymmdd(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y%m%d").ok()
}

fn format_yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// `sessionTable(market) -> ordered list of Session`.
#[must_use]
pub fn session_table(kind: MarketKind) -> Vec<crate::market::profile::Session> {
    MarketProfile::for_market(kind).sessions
}

/// The market's default profile with its timezone replaced by the
/// configured (or downgraded) one, so callers get one value carrying both
/// the session table and the effective tz.
#[must_use]
pub fn effective_profile(config: &Config, kind: MarketKind) -> MarketProfile {
    let mut profile = MarketProfile::for_market(kind);
    profile.timezone = resolve_timezone(config, kind);
    profile
}

#[cfg(test)]
mod tests {
    use super::{previous_trading_day, trading_state, TradingState};
    use crate::market::profile::MarketProfile;
    use crate::symbol::{MarketKind, Symbol};
    use chrono::TimeZone;
    use chrono_tz::Asia::Shanghai;

    #[test]
    fn live_at_ten_am_shanghai_on_a_tuesday() {
        let profile = MarketProfile::for_market(MarketKind::China);
        // 2025-01-07 is a Tuesday.
        let now = Shanghai
            .with_ymd_and_hms(2025, 1, 7, 10, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(trading_state(now, &profile), TradingState::Live);
    }

    #[test]
    fn between_sessions_is_postmarket() {
        let profile = MarketProfile::for_market(MarketKind::China);
        let now = Shanghai
            .with_ymd_and_hms(2025, 1, 7, 12, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(trading_state(now, &profile), TradingState::PostMarket);
    }

    #[test]
    fn weekend_overrides_time_of_day() {
        let profile = MarketProfile::for_market(MarketKind::China);
        // 2025-01-04 is a Saturday.
        let now = Shanghai
            .with_ymd_and_hms(2025, 1, 4, 10, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(trading_state(now, &profile), TradingState::Weekend);
    }

    #[test]
    fn previous_trading_day_skips_weekend() {
        // 2025-01-06 is a Monday; 01-04/01-05 are Sat/Sun.
        let symbol = Symbol::new("SH600000");
        assert_eq!(previous_trading_day(&symbol, "20250106"), "20250103");
    }

    #[test]
    fn previous_trading_day_passthrough_on_unparsable_input() {
        let symbol = Symbol::new("AAPL");
        assert_eq!(previous_trading_day(&symbol, "not-a-date"), "not-a-date");
    }
}
