//! Testing utilities and mocks for integration tests
//!
//! Provides:
//! - ScriptedProvider: programmable snapshot provider
//! - Snapshot builders (single scenario, strike ladders)

pub mod helpers;
pub mod mock_provider;

pub use helpers::*;
pub use mock_provider::ScriptedProvider;
