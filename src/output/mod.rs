// src/output/mod.rs
// =============================================================================
// This module turns check outcomes into result lines and writes them out.
//
// Submodules:
// - sink: The single writer every task sends its line through
//
// Line format (one per site, nothing else on stdout):
//
//   OK GitHub https://github.com/bob
//   NO GitLab https://gitlab.com/bob
//
// Only a received 200 is "OK". Non-200 codes and failed requests both print
// "NO" with no extra marker; the cause only shows up in the debug log.
// =============================================================================

mod sink;

use crate::checker::CheckOutcome;

pub use sink::{LineEmitter, ResultSink};

pub fn format_line(outcome: &CheckOutcome) -> String {
    let verdict = if outcome.is_ok() { "OK" } else { "NO" };
    format!(
        "{} {} {}",
        verdict,
        outcome.site.name(),
        outcome.site.resolved_url()
    )
}
