//! CLI argument validators.

use crate::config::Override;

/// Parse a `key=value` style config override.
pub fn parse_override(s: &str) -> Result<Override, String> {
    s.parse()
}
