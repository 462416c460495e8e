//! Observability utilities.
//!
//! The engine only emits `tracing` events; installing a subscriber is up to
//! the host application. [`init_tracing`] is a ready-made one.

mod subscriber;

pub use subscriber::{init_tracing, try_init_tracing, LogFormat, TracingConfig, TracingInitError};
