//! Option-chain data: snapshot model, provider trait, NSE client

pub mod nse;
pub mod provider;
pub mod types;

pub use nse::NseClient;
pub use provider::SnapshotProvider;
pub use types::{ChainEntry, OptionSide, Snapshot, ABSENT_STRIKE};
