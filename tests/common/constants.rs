//! Shared constants for end-to-end tests
//!
//! When the lookup stub's data changes, update only this file.

// ============================================================================
// Lookup Stub Data
// ============================================================================

/// Group known to the stub lookup service
pub const KNOWN_GROUP: &str = "Muse";

/// Song known to the stub lookup service
pub const KNOWN_SONG: &str = "Uprising";

pub const KNOWN_RELEASE_DATE: &str = "2009-09-14";

pub const KNOWN_TEXT: &str = "The paranoia is in bloom\nThe PR transmissions will resume";

pub const KNOWN_LINK: &str = "https://example.com/u";

/// Group the stub answers with a server error
pub const BROKEN_GROUP: &str = "Broken Records";

/// Group the stub answers only after the client timeout has elapsed
pub const SLOW_GROUP: &str = "Slowdive";

// ============================================================================
// Timeouts
// ============================================================================

/// Per-lookup timeout given to the enrichment client under test
pub const ENRICHMENT_TIMEOUT_MS: u64 = 300;

/// How long the stub stalls for SLOW_GROUP
pub const SLOW_RESPONSE_DELAY_MS: u64 = 2_000;

/// Maximum time to wait for server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5_000;

/// Interval between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Default timeout for HTTP requests in tests
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
