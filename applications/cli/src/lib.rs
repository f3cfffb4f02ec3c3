//! Aria Player - headless host
//!
//! Drives a `PlayerSession` from the terminal against a real backend, with
//! a simulated audio element standing in for the browser.

pub mod commands;
pub mod config;
pub mod host;
pub mod player;
