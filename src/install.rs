//! First-run detection.

use std::io;
use std::path::Path;

const MARKER: &str = ".installed";

pub(crate) const WELCOME_TITLE: &str = "UTEC Extractor Installed";
pub(crate) const WELCOME_MESSAGE: &str =
    "Open conference.utec.edu.pe in Chrome and type `extract` to collect links";

/// Record the first launch under `home`. Returns `true` only that once.
pub(crate) fn mark_first_run(home: &Path) -> io::Result<bool> {
    let marker = home.join(MARKER);
    if marker.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(home)?;
    std::fs::write(&marker, env!("CARGO_PKG_VERSION"))?;
    Ok(true)
}
