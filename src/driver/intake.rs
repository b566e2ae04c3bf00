//! Archive Intake
//!
//! Finds `*.zip` archives in the input directory and unpacks each into its
//! own staging subdirectory.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use log::{debug, info};
use zip::ZipArchive;

use crate::error::IntakeError;

/// Extension of input archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Lists the archives in `dir`, sorted by file name.
///
/// Only regular files directly inside `dir` are considered.
pub fn discover_archives(dir: &Path) -> Result<Vec<PathBuf>, IntakeError> {
    let discover_err = |source: std::io::Error| IntakeError::Discover {
        path: dir.to_path_buf(),
        source,
    };

    let mut archives = Vec::new();
    for entry in fs::read_dir(dir).map_err(discover_err)? {
        let path = entry.map_err(discover_err)?.path();
        let is_archive = path.extension().is_some_and(|ext| ext == ARCHIVE_EXTENSION);
        if is_archive && path.is_file() {
            archives.push(path);
        }
    }

    archives.sort();
    info!("Discovered {} archive(s) in {}", archives.len(), dir.display());
    Ok(archives)
}

/// Workflow identifier of an archive: its file name without `.zip`.
///
/// The identifier names a staging subdirectory, a ledger line and an output
/// file, so it must be a single plain path component without line breaks.
/// `..zip` and `...zip` (stems `.` and `..`) are rejected.
pub fn workflow_id(archive: &Path) -> Result<String, IntakeError> {
    archive
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| is_plain_component(s) && !s.contains(['\r', '\n']))
        .map(str::to_string)
        .ok_or_else(|| IntakeError::InvalidName {
            path: archive.to_path_buf(),
        })
}

fn is_plain_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Extracts every entry of `archive` below `dest`, overwriting existing files.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<usize, IntakeError> {
    let file = File::open(archive).map_err(|source| IntakeError::Open {
        path: archive.to_path_buf(),
        source,
    })?;

    let extract_err = |source: zip::result::ZipError| IntakeError::Extract {
        path: archive.to_path_buf(),
        source,
    };

    let mut zip = ZipArchive::new(file).map_err(extract_err)?;
    let entries = zip.len();
    zip.extract(dest).map_err(extract_err)?;

    debug!(
        "Extracted {} entries from {} into {}",
        entries,
        archive.display(),
        dest.display()
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_discover_archives_filters_and_sorts() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("b.zip"), b"").unwrap();
        fs::write(temp_dir.path().join("a.zip"), b"").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(temp_dir.path().join("dir.zip")).unwrap();

        let archives = discover_archives(temp_dir.path()).unwrap();
        let names: Vec<_> = archives
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a.zip", "b.zip"]);
    }

    #[test]
    fn test_discover_archives_missing_directory() {
        let result = discover_archives(Path::new("/nonexistent/archives"));
        assert!(matches!(result, Err(IntakeError::Discover { .. })));
    }

    #[test]
    fn test_workflow_id_from_file_stem() {
        assert_eq!(workflow_id(Path::new("/in/sample.zip")).unwrap(), "sample");
        assert_eq!(workflow_id(Path::new("nightly.etl.zip")).unwrap(), "nightly.etl");
        assert!(workflow_id(Path::new("/")).is_err());
    }

    #[test]
    fn test_workflow_id_rejects_dot_stems() {
        assert!(matches!(
            workflow_id(Path::new("/in/..zip")),
            Err(IntakeError::InvalidName { .. })
        ));
        assert!(matches!(
            workflow_id(Path::new("/in/...zip")),
            Err(IntakeError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_workflow_id_hidden_name_is_not_an_archive() {
        // `.zip` has no extension, only a dotted stem
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join(".zip"), b"").unwrap();

        assert_eq!(workflow_id(Path::new("/in/.zip")).unwrap(), ".zip");
        assert!(discover_archives(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_workflow_id_rejects_line_breaks() {
        assert!(workflow_id(Path::new("/in/evil\nsecond.zip")).is_err());
        assert!(workflow_id(Path::new("/in/evil\rsecond.zip")).is_err());
    }

    #[test]
    fn test_extract_archive() {
        let temp_dir = tempdir().unwrap();
        let archive = temp_dir.path().join("sample.zip");
        write_zip(&archive, &[("sample.json", "{}"), ("helper.sh", "echo hi")]);

        let dest = temp_dir.path().join("staging");
        let count = extract_archive(&archive, &dest).unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(dest.join("sample.json")).unwrap(), "{}");
        assert!(dest.join("helper.sh").exists());
    }

    #[test]
    fn test_extract_corrupt_archive() {
        let temp_dir = tempdir().unwrap();
        let archive = temp_dir.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let result = extract_archive(&archive, &temp_dir.path().join("out"));
        assert!(matches!(result, Err(IntakeError::Extract { .. })));
    }

    #[test]
    fn test_extract_missing_archive() {
        let temp_dir = tempdir().unwrap();
        let result = extract_archive(&temp_dir.path().join("gone.zip"), temp_dir.path());
        assert!(matches!(result, Err(IntakeError::Open { .. })));
    }
}
