//! Unit tests for the pipeline movement core.
//!
//! Tests are organised by concern: domain validation, the movement state
//! machine, and the board view model. Timing-sensitive tests run on a
//! paused tokio clock so backoff windows elapse deterministically.

pub mod support;

mod board_tests;
