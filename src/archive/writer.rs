// src/archive/writer.rs
// =============================================================================
// Packing staged files into the final ZIP.
//
// The archive is only opened once we know at least one staged file is on
// disk, so a run where every download failed leaves no empty ZIP behind.
// Staged files are deleted only once the archive is finished; if writing
// fails, the partial ZIP goes and every staged file stays.
// =============================================================================

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::crawl::CollectedFile;
use crate::error::{HarvestError, Result};

#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub path: PathBuf,
    /// Entry names, in the order they were written
    pub entries: Vec<String>,
}

/// Writes every staged file into `output`; None when there was nothing to pack
pub fn write_archive(files: &[CollectedFile], output: &Path) -> Result<Option<ArchiveReport>> {
    let mut staged = Vec::new();
    for file in files {
        match &file.local_path {
            Some(path) if path.is_file() => staged.push(path.as_path()),
            Some(path) => warn!("Warning: File not found, skipping: {}", path.display()),
            None => warn!("Warning: {} was not downloaded, skipping", file.source_url),
        }
    }

    if staged.is_empty() {
        return Ok(None);
    }

    match pack(&staged, output) {
        Ok(entries) if entries.is_empty() => {
            // Every staged file vanished between the check and the read
            remove_partial(output);
            Ok(None)
        }
        Ok(entries) => {
            info!("ZIP file created: {} ({} files)", output.display(), entries.len());
            Ok(Some(ArchiveReport {
                path: output.to_path_buf(),
                entries,
            }))
        }
        Err(e) => {
            remove_partial(output);
            Err(e)
        }
    }
}

fn pack(staged: &[&Path], output: &Path) -> Result<Vec<String>> {
    let archive_err = |source: ZipError| HarvestError::Archive {
        path: output.to_path_buf(),
        source,
    };

    let file = File::create(output).map_err(|e| HarvestError::fs(output, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = Vec::new();
    let mut packed = Vec::new();
    for path in staged {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{}", HarvestError::fs(*path, e));
                continue;
            }
        };

        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };

        zip.start_file(name.clone(), options).map_err(archive_err)?;
        zip.write_all(&bytes)
            .map_err(|e| archive_err(ZipError::from(e)))?;

        entries.push(name);
        packed.push(*path);
    }

    zip.finish().map_err(archive_err)?;

    for path in packed {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("{}", HarvestError::fs(path, e));
        }
    }
    Ok(entries)
}

fn remove_partial(output: &Path) {
    if output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            warn!("{}", HarvestError::fs(output, e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use url::Url;

    fn staged_file(dir: &Path, name: &str, body: &[u8]) -> CollectedFile {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        let url = Url::parse(&format!("http://x.test/{}", name)).unwrap();
        let mut file = CollectedFile::new(url, name.to_string());
        file.local_path = Some(path);
        file
    }

    #[test]
    fn test_archive_contains_files_and_staging_is_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.zip");
        let files = vec![
            staged_file(dir.path(), "report.pdf", b"%PDF-1.7"),
            staged_file(dir.path(), "notes.txt", b"hello"),
        ];

        let report = write_archive(&files, &output).unwrap().unwrap();
        assert_eq!(report.entries, vec!["report.pdf", "notes.txt"]);

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut content = String::new();
        archive.by_name("notes.txt").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello");

        assert!(!dir.path().join("report.pdf").exists());
        assert!(!dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_missing_local_paths_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.zip");

        let gone = staged_file(dir.path(), "gone.bin", b"x");
        std::fs::remove_file(gone.local_path.as_ref().unwrap()).unwrap();
        let never = CollectedFile::new(Url::parse("http://x.test/never").unwrap(), "never".into());
        let kept = staged_file(dir.path(), "kept.txt", b"kept");

        let report = write_archive(&[gone, never, kept], &output).unwrap().unwrap();
        assert_eq!(report.entries, vec!["kept.txt"]);
    }

    #[test]
    fn test_no_staged_files_means_no_archive() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.zip");
        let never = CollectedFile::new(Url::parse("http://x.test/never").unwrap(), "never".into());

        assert!(write_archive(&[never], &output).unwrap().is_none());
        assert!(!output.exists());
    }

    #[test]
    fn test_failed_archive_keeps_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        // The output's parent is a regular file, so the ZIP cannot be created
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let output = blocker.join("out.zip");
        let files = vec![
            staged_file(dir.path(), "report.pdf", b"%PDF-1.7"),
            staged_file(dir.path(), "notes.txt", b"hello"),
        ];

        let err = write_archive(&files, &output).unwrap_err();

        assert!(matches!(err, HarvestError::FileSystem { .. }));
        assert!(dir.path().join("report.pdf").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(!output.exists());
    }
}
