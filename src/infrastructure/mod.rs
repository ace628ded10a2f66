//! Shared runtime resources: the delay scheduler and the result sink.
//!
//! These are the only mutable state in the simulator. Both are explicitly
//! constructed and handed to the dispatcher, never reached through globals.

pub mod result_sink;
pub mod scheduler;
