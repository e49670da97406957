//! Shared wire types for mphook.
//!
//! Webhook receivers can depend on this crate alone to deserialize the
//! dispatch envelopes sent by the monitor.

pub mod objects;
