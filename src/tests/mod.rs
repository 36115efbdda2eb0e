//! Cross-module unit suites for path resolution and ranking.

mod helpers;
mod ranking;
