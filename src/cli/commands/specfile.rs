use std::path::Path;

use crate::cli::error::CliResult;
use crate::specfile;

/// Print the expanded upstream URL of a spec file, or an empty line.
pub fn upstream_url(path: &Path) -> CliResult<String> {
    Ok(specfile::upstream_url(path)?)
}
