//! This module provides the structured logging hook used by the stream encoder
//! and decoder to make their segment decisions visible.
//!
//! The `log_metric!` macro formats key/value pairs as a JSON-like record and
//! hands it to the `log` facade at `trace` level. The formatting work is skipped
//! entirely unless a logger has enabled that level, so the per-segment calls
//! cost a single level check in normal runs.

/// Logs a structured key-value metric record at trace level.
///
/// # Example
/// ```ignore
/// let count = 8;
/// log_metric!("event" = "segment", "kind" = "literal", "count" = count);
/// ```
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if log::log_enabled!(log::Level::Trace) {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::trace!("SPIKEPACK_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}
