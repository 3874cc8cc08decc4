//! WHOIS lookup interface and the system `whois` command backend.
//!
//! The batch engine never parses WHOIS text itself. It calls a
//! [`WhoisLookup`] and hands the outcome to the classifier. The only parsing
//! done here is what a WHOIS client library would do: pull out the
//! `Domain Name:` field, and report "not found" style answers as errors.

use std::fmt;
use std::process::Command;
use tracing::debug;

/// Parsed WHOIS answer for one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisRecord {
    /// Value of the registry's "domain name" field, if any
    pub domain_name: Option<String>,

    /// Raw response text
    pub raw: String,
}

impl WhoisRecord {
    pub fn registered<D: Into<String>>(domain_name: D) -> Self {
        Self {
            domain_name: Some(domain_name.into()),
            raw: String::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The domain name field, if present and non-blank.
    pub fn populated_domain_name(&self) -> Option<&str> {
        self.domain_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Failed WHOIS lookup. Only the message is meaningful to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    pub message: String,
}

impl LookupError {
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LookupError {}

/// Result of a single lookup call.
pub type LookupOutcome = Result<WhoisRecord, LookupError>;

/// Anything that can answer a WHOIS query for a domain.
///
/// Implementations are called from blocking worker threads and may block
/// on network I/O. They must be shareable across threads.
pub trait WhoisLookup: Send + Sync + 'static {
    fn lookup(&self, domain: &str) -> LookupOutcome;
}

impl<F> WhoisLookup for F
where
    F: Fn(&str) -> LookupOutcome + Send + Sync + 'static,
{
    fn lookup(&self, domain: &str) -> LookupOutcome {
        self(domain)
    }
}

// Phrases registries use to say "no such domain". WHOIS client libraries
// raise these as errors rather than returning an empty record.
const NOT_FOUND_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "status: free",
    "status: available",
    "no object found",
    "object does not exist",
];

const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit exceeded",
    "too many requests",
    "try again later",
    "quota exceeded",
    "limit exceeded",
    "throttled",
];

/// WHOIS client backed by the system's `whois` command.
///
/// There is no per-call timeout; a lookup takes as long as the `whois`
/// command does.
#[derive(Debug, Clone)]
pub struct SystemWhoisClient {
    program: String,
}

impl SystemWhoisClient {
    pub fn new() -> Self {
        Self {
            program: "whois".to_string(),
        }
    }

    /// Use a different executable (e.g. an absolute path to `whois`).
    pub fn with_program<P: Into<String>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemWhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisLookup for SystemWhoisClient {
    fn lookup(&self, domain: &str) -> LookupOutcome {
        let output = Command::new(&self.program)
            .arg(domain)
            .output()
            .map_err(|e| {
                LookupError::new(format!(
                    "failed to execute {} command: {}. Make sure 'whois' is installed",
                    self.program, e
                ))
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            text = String::from_utf8_lossy(&output.stderr).into_owned();
        }

        debug!(domain, bytes = text.len(), status = ?output.status, "whois command finished");
        parse_whois_response(&text)
    }
}

/// Interpret raw WHOIS text the way a WHOIS client library would.
///
/// - A populated `Domain Name:` field yields a record with that name.
/// - A rate-limit notice or a "not found" phrase yields a [`LookupError`]
///   carrying the matching line.
/// - Anything else yields a record without a domain name.
pub fn parse_whois_response(text: &str) -> LookupOutcome {
    if let Some(name) = extract_domain_name(text) {
        return Ok(WhoisRecord {
            domain_name: Some(name),
            raw: text.to_string(),
        });
    }

    if let Some(line) = find_line_matching(text, RATE_LIMIT_PATTERNS) {
        return Err(LookupError::new(format!("rate limited: {}", line)));
    }

    if let Some(line) = find_line_matching(text, NOT_FOUND_PATTERNS) {
        return Err(LookupError::new(line));
    }

    Ok(WhoisRecord {
        domain_name: None,
        raw: text.to_string(),
    })
}

fn extract_domain_name(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if (key == "domain name" || key == "domain") && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn find_line_matching(text: &str, patterns: &[&str]) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| {
            let lower = line.to_lowercase();
            patterns.iter().any(|pattern| lower.contains(pattern))
        })
        .map(str::to_string)
}
