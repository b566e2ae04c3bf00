//! Staging Area Housekeeping
//!
//! After each archive, auxiliary scripts are moved to the scripts directory
//! and whatever is left in the archive's staging directory is removed.
//! Every failure here is logged and swallowed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

/// Marker file requesting regeneration of an already processed workflow.
pub const FORCE_MARKER: &str = "force.flag";

/// Extensions of auxiliary files relocated to the scripts directory.
pub const SCRIPT_EXTENSIONS: &[&str] = &["py", "sh"];

/// Returns true if the staging directory carries a force marker.
pub fn has_force_marker(staging_dir: &Path) -> bool {
    staging_dir.join(FORCE_MARKER).is_file()
}

fn is_auxiliary_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

/// Moves a file, falling back to copy and delete across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!("rename failed ({}), copying instead", rename_err);
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

/// Moves top-level `.py`/`.sh` files from `staging_dir` into `scripts_dir`.
///
/// Existing files of the same name are replaced. Returns the new paths.
pub fn relocate_scripts(staging_dir: &Path, scripts_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(staging_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot scan {} for scripts: {}", staging_dir.display(), e);
            return Vec::new();
        }
    };

    let scripts: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_auxiliary_script(path))
        .collect();

    if scripts.is_empty() {
        return Vec::new();
    }

    if let Err(e) = fs::create_dir_all(scripts_dir) {
        warn!("Cannot create scripts directory {}: {}", scripts_dir.display(), e);
        return Vec::new();
    }

    let mut moved = Vec::new();
    for script in scripts {
        let Some(name) = script.file_name() else {
            continue;
        };
        let target = scripts_dir.join(name);

        match move_file(&script, &target) {
            Ok(()) => {
                info!("Moved script {} -> {}", script.display(), target.display());
                moved.push(target);
            }
            Err(e) => warn!("Failed to move {}: {}", script.display(), e),
        }
    }

    moved
}

/// Deletes everything inside `staging_dir`, then the directory itself.
///
/// Returns the number of entries that could not be removed.
pub fn purge(staging_dir: &Path) -> usize {
    let entries = match fs::read_dir(staging_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return 0,
        Err(e) => {
            warn!("Cannot scan {} for cleanup: {}", staging_dir.display(), e);
            return 1;
        }
    };

    let mut failures = 0;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        if let Err(e) = result {
            warn!("Failed to remove {}: {}", path.display(), e);
            failures += 1;
        }
    }

    if failures == 0 {
        if let Err(e) = fs::remove_dir(staging_dir) {
            warn!("Failed to remove {}: {}", staging_dir.display(), e);
            failures += 1;
        }
    }

    debug!("Cleaned up {} ({} failures)", staging_dir.display(), failures);
    failures
}
