//! Stable machine-readable error codes.
//!
//! Codes are embedded in `Display` output (bracketed prefix) and exposed via
//! `code()` accessors so callers can match on failures without parsing
//! messages. Codes are append-only; never renumber.

pub(crate) const GRAPH_INVALID_INDEX: &str = "FLDSP_GRAPH_001";

pub(crate) const MATCH_NON_FINITE_COST: &str = "FLDSP_MATCH_001";

pub(crate) const PATH_UNREACHABLE: &str = "FLDSP_PATH_001";
