//! TUI module for the interview tracker
//!
//! Provides the interactive screens:
//! - Welcome: sign-in hint while the session bootstrap settles
//! - Dashboard: the user's own interviews with stats and filters
//! - Community: publicly shared interviews with search and sorting

mod app;

pub use app::run;
