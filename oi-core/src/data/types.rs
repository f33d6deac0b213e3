//! Option-chain snapshot model
//!
//! A [`Snapshot`] is one point-in-time read of the chain for a symbol. It is
//! immutable once received and carries no timestamps: every scrape fetches a
//! fresh one.

/// Strike price the provider uses to mark a missing put or call
pub const ABSENT_STRIKE: i64 = 0;

/// One option-chain read for a symbol
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Spot price of the underlying instrument
    pub underlying_value: f64,
    /// One entry per (expiry, strike) pair returned by the provider
    pub entries: Vec<ChainEntry>,
}

impl Snapshot {
    pub fn new(underlying_value: f64, entries: Vec<ChainEntry>) -> Self {
        Self {
            underlying_value,
            entries,
        }
    }

    /// Number of sides that will produce samples
    pub fn present_sides(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.put.is_present() as usize + e.call.is_present() as usize)
            .sum()
    }
}

/// One (expiry, strike) row of the chain
///
/// `strike_price` here and `put.strike_price` / `call.strike_price` are
/// decoded independently and are not required to agree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainEntry {
    /// Entry-level strike price
    pub strike_price: i64,
    /// Expiry as sent by the provider, e.g. `28-Nov-2024` (never parsed)
    pub expiry_date: String,
    /// Put side, absent when its strike is [`ABSENT_STRIKE`]
    pub put: OptionSide,
    /// Call side, absent when its strike is [`ABSENT_STRIKE`]
    pub call: OptionSide,
}

/// Quote data for one side of a chain entry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptionSide {
    pub strike_price: i64,
    pub open_interest: f64,
    pub last_price: f64,
}

impl OptionSide {
    pub fn new(strike_price: i64, open_interest: f64, last_price: f64) -> Self {
        Self {
            strike_price,
            open_interest,
            last_price,
        }
    }

    /// A side is present unless the provider sent the zero-strike sentinel
    #[inline(always)]
    pub fn is_present(&self) -> bool {
        self.strike_price != ABSENT_STRIKE
    }
}
