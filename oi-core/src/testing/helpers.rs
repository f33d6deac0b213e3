//! Test data builders for option-chain snapshots

use crate::data::{ChainEntry, OptionSide, Snapshot};

/// Build one side of a chain entry
pub fn side(strike_price: i64, open_interest: f64, last_price: f64) -> OptionSide {
    OptionSide::new(strike_price, open_interest, last_price)
}

/// Build a chain entry whose entry-level strike follows the first present side
pub fn entry(expiry_date: &str, put: OptionSide, call: OptionSide) -> ChainEntry {
    let strike_price = if put.is_present() {
        put.strike_price
    } else {
        call.strike_price
    };

    ChainEntry {
        strike_price,
        expiry_date: expiry_date.to_string(),
        put,
        call,
    }
}

/// Single-strike BANKNIFTY chain: spot 48000.5, strike 48000, both sides present
pub fn scenario_snapshot() -> Snapshot {
    Snapshot::new(
        48000.5,
        vec![entry(
            "28-Nov-2024",
            side(48000, 1200.0, 55.1),
            side(48000, 900.0, 40.0),
        )],
    )
}

/// Chain of `strikes` consecutive strikes, `step` apart, both sides present
pub fn ladder_snapshot(underlying: f64, first_strike: i64, step: i64, strikes: usize) -> Snapshot {
    let entries = (0..strikes as i64)
        .map(|i| {
            let strike = first_strike + i * step;
            entry(
                "28-Nov-2024",
                side(strike, 100.0 + i as f64, 10.0 + i as f64),
                side(strike, 200.0 + i as f64, 20.0 + i as f64),
            )
        })
        .collect();

    Snapshot::new(underlying, entries)
}
