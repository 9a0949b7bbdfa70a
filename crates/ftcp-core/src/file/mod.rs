//! File operations for FTCP.
//!
//! This module is the filesystem side of a transfer:
//!
//! - Reading the source file chunk-by-chunk on the sender
//! - Writing received chunks to a hidden temp file on the receiver
//! - Atomic finalization (temp file → destination name)
//! - Filename sanitization and disk-space probing
//!
//! The destination name never exists until the last chunk has been written
//! and fsynced; a crashed transfer leaves at most `.name.tmp` behind.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::MAX_FILENAME_LEN;

/// Get Unix file permissions from metadata.
#[cfg(unix)]
fn get_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

/// Get Unix file permissions from metadata.
///
/// Non-Unix platforms don't use mode bits; report a plain file default.
#[cfg(not(unix))]
fn get_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}

/// Apply Unix mode bits to a file.
///
/// # Errors
///
/// Returns an error if the permission change fails on Unix.
#[cfg(unix)]
pub fn apply_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let perms = std::fs::Permissions::from_mode(mode & 0o7777);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

/// Apply Unix mode bits to a file.
///
/// No-op on non-Unix platforms.
#[cfg(not(unix))]
pub fn apply_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Metadata of the file being sent.
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// Base name of the file
    pub filename: String,
    /// Size in bytes
    pub size: u64,
    /// Unix-style permission bits
    pub mode: u32,
    /// Modification time, seconds since epoch
    pub modified: u64,
}

/// The sender's handle to the source file.
#[derive(Debug)]
pub struct SourceFile {
    file: tokio::fs::File,
    path: PathBuf,
    /// Metadata captured at open time
    pub metadata: SourceMetadata,
}

impl SourceFile {
    /// Open a source file and capture its metadata.
    ///
    /// # Errors
    ///
    /// Fails if the path cannot be opened, is not a regular file, or has a
    /// name that does not fit the wire format's 256-byte field.
    pub async fn open(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| Error::FileOpen {
                path: path.display().to_string(),
                source,
            })?;

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(Error::NotAFile(path.display().to_string()));
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidFilename(path.display().to_string()))?;
        if filename.len() >= MAX_FILENAME_LEN {
            return Err(Error::FilenameTooLong(filename));
        }

        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());

        let meta = SourceMetadata {
            filename,
            size: metadata.len(),
            mode: get_mode(&metadata),
            modified,
        };

        Ok(Self {
            file,
            path: path.to_path_buf(),
            metadata: meta,
        })
    }

    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// A read past the end of the file (the source shrank mid-transfer)
    /// fails with [`Error::FileRead`].
    pub async fn read_chunk_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.file.seek(std::io::SeekFrom::Start(offset)).await?;

        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = self.file.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(Error::FileRead {
                    path: self.path.display().to_string(),
                    expected: len,
                    got: filled,
                });
            }
            filled += n;
        }
        Ok(buf)
    }
}

/// Writer that assembles the incoming file under a hidden temp name and
/// publishes it atomically on success.
#[derive(Debug)]
pub struct TempFileWriter {
    file: Option<tokio::fs::File>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl TempFileWriter {
    /// Create the temp sink `<dir>/.<name>.tmp` for a sanitized filename.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be created.
    pub async fn create(output_dir: &Path, name: &str) -> Result<Self> {
        let temp_path = output_dir.join(format!(".{name}.tmp"));
        let final_path = output_dir.join(name);

        let file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|source| Error::FileOpen {
                path: temp_path.display().to_string(),
                source,
            })?;

        Ok(Self {
            file: Some(file),
            temp_path,
            final_path,
        })
    }

    /// Path of the temp sink.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Path the file will be published under.
    #[must_use]
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Write `data` at the given byte offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileWrite`] if the seek or write fails.
    pub async fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let path = self.temp_path.display().to_string();
        if let Some(file) = self.file.as_mut() {
            file.seek(std::io::SeekFrom::Start(offset))
                .await
                .map_err(|source| Error::FileWrite {
                    path: path.clone(),
                    source,
                })?;
            file.write_all(data)
                .await
                .map_err(|source| Error::FileWrite { path, source })?;
        }
        Ok(())
    }

    /// Flush, fsync, and atomically rename the temp file to its final name.
    ///
    /// On platforms without overwrite-rename semantics the existing
    /// destination is unlinked first; a failed unlink of a nonexistent
    /// prior file is logged, not fatal. `mode` (when nonzero) is applied to
    /// the published file on Unix.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync or rename fails; the temp file is left
    /// in place for the caller's cleanup path in that case.
    pub async fn finalize(mut self, mode: u32) -> Result<PathBuf> {
        if let Some(mut file) = self.file.take() {
            let path = self.temp_path.display().to_string();
            file.flush().await.map_err(|source| Error::FileWrite {
                path: path.clone(),
                source,
            })?;
            file.sync_all()
                .await
                .map_err(|source| Error::FileWrite { path, source })?;
        }

        #[cfg(windows)]
        if tokio::fs::try_exists(&self.final_path).await.unwrap_or(false) {
            if let Err(e) = tokio::fs::remove_file(&self.final_path).await {
                tracing::warn!(
                    "failed to remove existing {}: {e}",
                    self.final_path.display()
                );
            }
        }

        tokio::fs::rename(&self.temp_path, &self.final_path)
            .await
            .map_err(|source| Error::FileWrite {
                path: self.final_path.display().to_string(),
                source,
            })?;

        if mode != 0 {
            if let Err(e) = apply_permissions(&self.final_path, mode) {
                tracing::warn!(
                    "failed to apply mode {mode:o} to {}: {e}",
                    self.final_path.display()
                );
            }
        }

        tracing::info!(path = %self.final_path.display(), "file finalized");
        Ok(self.final_path)
    }

    /// Drop the temp file after a failed transfer.
    ///
    /// Removal failures are logged, never propagated; the transfer error
    /// that got us here is the one worth reporting.
    pub async fn discard(mut self) {
        self.file.take();
        if let Err(e) = tokio::fs::remove_file(&self.temp_path).await {
            tracing::warn!("failed to remove {}: {e}", self.temp_path.display());
        } else {
            tracing::debug!(path = %self.temp_path.display(), "temp file removed");
        }
    }
}

/// Sanitize a filename declared by a peer.
///
/// Rejects traversal (`..`), absolute paths (`/`, `\`, `X:`); path
/// separators become `_`; everything outside `[A-Za-z0-9._-]` is dropped.
///
/// # Errors
///
/// Returns [`Error::InvalidFilename`] when the name is rejected outright or
/// nothing survives filtering.
pub fn sanitize_filename(raw: &str) -> Result<String> {
    if raw.contains("..") {
        return Err(Error::InvalidFilename(raw.to_string()));
    }

    let bytes = raw.as_bytes();
    if bytes.first().is_some_and(|&b| b == b'/' || b == b'\\') {
        return Err(Error::InvalidFilename(raw.to_string()));
    }
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err(Error::InvalidFilename(raw.to_string()));
    }

    let sanitized: String = raw
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => Some(c),
            '/' | '\\' => Some('_'),
            _ => None,
        })
        .collect();

    if sanitized.is_empty() {
        return Err(Error::InvalidFilename(raw.to_string()));
    }

    Ok(sanitized)
}

/// Bytes available to unprivileged users on the filesystem holding `path`.
///
/// # Errors
///
/// Returns an error if the filesystem cannot be queried.
#[cfg(unix)]
pub fn disk_available(path: &Path) -> Result<u64> {
    let stat = nix::sys::statvfs::statvfs(path).map_err(std::io::Error::from)?;
    #[allow(clippy::unnecessary_cast)]
    Ok(stat.blocks_available() as u64 * stat.fragment_size() as u64)
}

/// Bytes available on the filesystem holding `path`.
///
/// No portable probe on this platform; report unlimited and let the write
/// path surface real exhaustion.
#[cfg(not(unix))]
pub fn disk_available(path: &Path) -> Result<u64> {
    tracing::debug!("no disk space probe on this platform for {}", path.display());
    Ok(u64::MAX)
}

/// Format a byte count for display.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_accepts_ordinary_names() {
        assert_eq!(sanitize_filename("report_v2.pdf").unwrap(), "report_v2.pdf");
        assert_eq!(sanitize_filename("a-b.c").unwrap(), "a-b.c");
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_filename("../etc/passwd").is_err());
        assert!(sanitize_filename("a/../b").is_err());
        assert!(sanitize_filename("...").is_err());
    }

    #[test]
    fn sanitize_rejects_absolute_paths() {
        assert!(sanitize_filename("/etc/passwd").is_err());
        assert!(sanitize_filename("\\share\\file").is_err());
        assert!(sanitize_filename("C:autoexec.bat").is_err());
        assert!(sanitize_filename("x:lowercase").is_err());
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("dir/file.txt").unwrap(), "dir_file.txt");
        assert_eq!(sanitize_filename("a\\b").unwrap(), "a_b");
    }

    #[test]
    fn sanitize_drops_odd_characters() {
        assert_eq!(
            sanitize_filename("my file (1) é.txt").unwrap(),
            "myfile1.txt"
        );
        assert!(sanitize_filename("   ").is_err());
    }

    #[tokio::test]
    async fn source_file_metadata_and_reads() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("source.bin");
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 256) as u8).collect();
        std::fs::write(&path, &content).expect("write");

        let mut source = SourceFile::open(&path).await.expect("open");
        assert_eq!(source.metadata.filename, "source.bin");
        assert_eq!(source.metadata.size, 10_000);

        let chunk = source.read_chunk_at(4096, 4096).await.expect("read");
        assert_eq!(chunk, &content[4096..8192]);

        // Reading past EOF means the source shrank; that must fail loudly.
        let err = source.read_chunk_at(9_000, 4096).await.unwrap_err();
        assert!(matches!(err, Error::FileRead { got: 1000, .. }));
    }

    #[tokio::test]
    async fn source_file_rejects_directories() {
        let dir = TempDir::new().expect("temp dir");
        assert!(matches!(
            SourceFile::open(dir.path()).await,
            Err(Error::NotAFile(_))
        ));
    }

    #[tokio::test]
    async fn temp_writer_publishes_atomically() {
        let dir = TempDir::new().expect("temp dir");
        let mut writer = TempFileWriter::create(dir.path(), "out.bin")
            .await
            .expect("create");

        assert!(dir.path().join(".out.bin.tmp").exists());
        assert!(!dir.path().join("out.bin").exists());

        writer.write_at(4, b"world").await.expect("write");
        writer.write_at(0, b"hell").await.expect("write");
        assert!(!dir.path().join("out.bin").exists());

        let path = writer.finalize(0o640).await.expect("finalize");
        assert_eq!(path, dir.path().join("out.bin"));
        assert!(!dir.path().join(".out.bin.tmp").exists());
        assert_eq!(std::fs::read(&path).expect("read"), b"hellworld");
    }

    #[tokio::test]
    async fn temp_writer_discard_removes_partial_file() {
        let dir = TempDir::new().expect("temp dir");
        let mut writer = TempFileWriter::create(dir.path(), "gone.bin")
            .await
            .expect("create");
        writer.write_at(0, b"partial").await.expect("write");

        writer.discard().await;
        assert!(!dir.path().join(".gone.bin.tmp").exists());
        assert!(!dir.path().join("gone.bin").exists());
    }

    #[test]
    fn disk_probe_reports_something_positive() {
        let dir = TempDir::new().expect("temp dir");
        let available = disk_available(dir.path()).expect("probe");
        assert!(available > 0);
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }
}
