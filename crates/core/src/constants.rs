//! Constants used throughout the paymeta core crate.

/// Fixed prefix of every payment description.
pub const DESCRIPTION_PREFIX: &str = "rss::payment::";

/// Characters reserved for the prefix and the two separating spaces.
pub const DESCRIPTION_RESERVED_LEN: usize = 16;

/// Ceiling imposed by the payment protocol's description field.
pub const DESCRIPTION_HARD_LIMIT: usize = 639;

/// Default directory for the local store when none is configured.
pub const DEFAULT_DATA_DIR: &str = "metadata_data";

/// Default action token when a submission does not name one.
pub const DEFAULT_ACTION: &str = "boost";

/// Path segment under the public base URL where documents are served.
pub const METADATA_ROUTE: &str = "metadata";
