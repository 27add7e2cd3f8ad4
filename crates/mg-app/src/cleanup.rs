use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

/// Best-effort removal of a temp file handed out by a provider
pub fn remove_temp_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Error cleaning up temporary file: {}", e),
    }
}

/// Delete regular files in `dir` last modified more than `max_age` before `now`.
///
/// A missing directory counts as empty. Returns the number of files removed.
pub fn sweep_older_than(dir: &Path, max_age: Duration, now: SystemTime) -> io::Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let age = now
            .duration_since(metadata.modified()?)
            .unwrap_or_default();
        if age <= max_age {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %entry.path().display(), "Could not remove stale file: {}", e),
        }
    }

    if removed > 0 {
        info!(dir = %dir.display(), removed, "Removed stale files");
    }
    Ok(removed)
}
