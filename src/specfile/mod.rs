//! RPM spec file reading
//!
//! Only the preamble is interpreted: tags and `%global` / `%define` macros
//! up to the first section marker. That is enough to answer questions like
//! "where does upstream live" without an rpm installation.

mod error;
mod preamble;


use std::path::Path;

use tracing::debug;

pub use error::SpecfileError;
pub use preamble::Preamble;

/// Expanded value of the `URL:` tag, or an empty string when the spec file
/// has none.
pub fn upstream_url(path: &Path) -> Result<String, SpecfileError> {
    let preamble = Preamble::from_path(path)?;
    let url = preamble.expanded_tag("url")?.unwrap_or_default();
    debug!(specfile = %path.display(), url = %url, "resolved upstream URL");
    Ok(url)
}
