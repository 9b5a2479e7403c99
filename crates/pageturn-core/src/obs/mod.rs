//! Observability: paging telemetry and sink abstractions.
//!
//! Paging logic never counts anything itself. All instrumentation flows
//! through `PagingEvent` and an injected `PagingSink`.

mod sink;

// re-exports
pub use sink::{CounterSink, NoopSink, PagingEvent, PagingReport, PagingSink};
