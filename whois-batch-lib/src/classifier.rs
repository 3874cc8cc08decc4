//! Turns a lookup outcome into an availability verdict.
//!
//! WHOIS answers are ambiguous: registries report unknown domains as errors,
//! throttle aggressively and word things differently. The policy below is
//! deliberately biased toward "available". A throttled or broken lookup is
//! reported as possibly free instead of being dropped from the results.
//!
//! | Outcome                                       | available | info prefix                                  |
//! |-----------------------------------------------|-----------|----------------------------------------------|
//! | record, no domain name                        | true      | `no whois data (likely available)`           |
//! | record with domain name                       | false     | `registered (...)`                           |
//! | error matching [`FREE_ERROR_PHRASES`]         | true      | `exception indicated free: ...`              |
//! | any other error                               | true      | `whois error (treated as available): ...`    |

use crate::protocols::{LookupError, LookupOutcome};
use crate::types::Verdict;

/// Error message fragments (matched case-insensitively) that mean the
/// registry has no record of the domain.
///
/// These come from WHOIS client error texts. If the client's wording
/// changes, this table has to follow.
pub const FREE_ERROR_PHRASES: &[&str] = &["no match", "not found", "no data found", "domain not found"];

/// Classify a lookup outcome. Total: every input yields a verdict with
/// non-empty `info`.
pub fn classify(outcome: &LookupOutcome) -> Verdict {
    match outcome {
        Ok(record) => match record.populated_domain_name() {
            Some(name) => Verdict::taken(format!("registered ({})", name)),
            None => Verdict::available("no whois data (likely available)"),
        },
        Err(err) => classify_error(err),
    }
}

fn classify_error(err: &LookupError) -> Verdict {
    if indicates_free(&err.message) {
        Verdict::available(format!("exception indicated free: {}", err.message))
    } else {
        Verdict::available(format!("whois error (treated as available): {}", err.message))
    }
}

/// Whether an error message says the domain is unregistered.
pub fn indicates_free(message: &str) -> bool {
    let lower = message.to_lowercase();
    FREE_ERROR_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Verdict for a worker that could not complete the lookup at all
/// (the lookup panicked or its thread could not be joined).
pub fn worker_fault(detail: &str) -> Verdict {
    Verdict::available(format!("worker fault (treated as available): {}", detail))
}
