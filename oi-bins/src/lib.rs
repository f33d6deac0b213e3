//! Shared setup for the exporter binaries

pub mod common;
