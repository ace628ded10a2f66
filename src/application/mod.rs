//! Application layer containing the dispatch orchestration.
//!
//! This module defines the `Dispatcher`, the primary entry point for submitting
//! simulated payments. It draws the channel delay and hands completion to the
//! shared `Scheduler`, which records results in the `ResultSink`.

pub mod dispatcher;
