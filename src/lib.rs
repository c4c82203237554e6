//! onair library - radio schedule "now playing / up next" board
//!
//! This module exports internal components for integration testing.

pub mod board;
pub mod cli;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod fetch;
pub mod render;
pub mod schedule;
pub mod selector;
pub mod staleness;
pub mod store;
