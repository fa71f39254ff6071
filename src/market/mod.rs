pub mod clock;
pub mod profile;

pub use clock::{
    effective_profile, expected_datapoints, market_of, previous_trading_day, resolve_timezone,
    session_table, trading_state, TradingState,
};
pub use profile::{MarketProfile, Session};
