//! Minute-aligned latency and packet-loss sampling with fping, published to
//! Graphite over the plaintext protocol.
//!
//! Each minute the scheduler runs one fping round against the configured
//! targets, reduces the per-packet replies and fping's own summaries to a
//! report per target, and sends six metric lines per target to the sink.
//! `SIGINT`/`SIGTERM` stop the loop and terminate a running probe;
//! `SIGUSR1` raises logging to debug.
pub mod app;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod probe;
pub mod shutdown;
pub mod sinks;
pub mod system;
