//! Lookup backends.
//!
//! The engine only talks to the [`WhoisLookup`] trait; the system `whois`
//! command wrapper is the default implementation.

pub mod whois;

pub use whois::{LookupError, LookupOutcome, SystemWhoisClient, WhoisLookup, WhoisRecord};
