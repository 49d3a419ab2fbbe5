//! Tracing utilities for compilation and materialization observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// quarry_trace_compile!("select", &sql, params.len());
/// ```
#[macro_export]
macro_rules! quarry_trace_compile {
    ($statement:literal, $sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(
            statement = $statement,
            sql = %$sql,
            params = $param_count,
            "quarry.compile"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (&$sql, &$param_count);
    };
}

/// Emit an info-level tracing event once a registry is built.
#[macro_export]
macro_rules! quarry_trace_registry {
    ($entities:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!(entities = $entities, "quarry.registry");
        #[cfg(not(feature = "tracing"))]
        let _ = &$entities;
    };
}

/// Emit a trace-level event after a row stream has been materialized.
#[macro_export]
macro_rules! quarry_trace_materialize {
    ($rows:expr, $objects:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(rows = $rows, objects = $objects, "quarry.materialize");
        #[cfg(not(feature = "tracing"))]
        let _ = (&$rows, &$objects);
    };
}
