//! Chunked upload, download and deletion of proposal attachments.
//!
//! Files are split into fixed-size chunks and moved one backend call at a
//! time, strictly in index order. There is no resume: any failed chunk
//! aborts the transfer and a retry starts again from chunk 0.

use factfund_ledger::LedgerIndex;
use factfund_types::{FileMeta, FundError, ProposalId};
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::backend::{Backend, FileChunk};
use crate::client::FundingClient;

/// Bytes per chunk (500 KiB as counted by the backend, 500 * 1024).
pub const CHUNK_SIZE: usize = 500 * 1024;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Number of chunks needed for `len` bytes.
pub fn total_chunks(len: usize) -> u64 {
    len.div_ceil(CHUNK_SIZE) as u64
}

/// Byte ranges of each chunk of a `len`-byte file, in index order.
pub fn plan_chunks(len: usize) -> Vec<Range<usize>> {
    (0..len)
        .step_by(CHUNK_SIZE)
        .map(|start| start..(start + CHUNK_SIZE).min(len))
        .collect()
}

/// Percentage reported after `done` of `total` chunks, rounded half up.
/// Only the final chunk reports 100.
pub fn progress_percent(done: u64, total: u64) -> u8 {
    if done >= total {
        return 100;
    }
    let (done, total) = (done as u128, total as u128);
    let percent = ((200 * done + total) / (2 * total)) as u8;
    percent.min(99)
}

/// Guess a mime type from a file extension.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// A file to attach to a proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            bytes,
        }
    }

    /// Read a file from disk, naming it after its final path component.
    pub fn from_path(path: &Path, mime_type: Option<String>) -> Result<Self, FundError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FundError::Validation(format!("{} has no file name", path.display())))?
            .to_string();
        let bytes = std::fs::read(path)
            .map_err(|e| FundError::Validation(format!("cannot read {}: {e}", path.display())))?;
        let mime_type = mime_type.or_else(|| Some(guess_mime_type(path).to_string()));
        Ok(Self::new(name, mime_type, bytes))
    }
}

/// A completed upload and the file list refetched after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSummary {
    pub file_name: String,
    pub total_chunks: u64,
    pub bytes: u64,
    pub files: Vec<FileMeta>,
}

/// A fully reassembled attachment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DownloadedFile {
    /// Write the file into `dir` and return its final path.
    ///
    /// Bytes go to a temporary file in `dir` that is renamed into place only
    /// once fully written; on any error it is removed.
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf, FundError> {
        let name = sanitize_file_name(&self.name)?;
        let target = dir.join(name);
        let io_err = |e: std::io::Error| {
            FundError::Validation(format!("cannot write {}: {e}", target.display()))
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&self.bytes).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&target).map_err(|e| io_err(e.error))?;
        tracing::debug!(path = %target.display(), bytes = self.bytes.len(), "saved download");
        Ok(target)
    }
}

/// Strip any directory components from a backend-supplied file name.
fn sanitize_file_name(name: &str) -> Result<&str, FundError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(FundError::Validation(format!(
            "unusable file name {name:?}"
        )));
    }
    Ok(base)
}

impl<B: Backend, L: LedgerIndex> FundingClient<B, L> {
    /// Upload `file` to proposal `id`, reporting progress after each chunk.
    pub async fn upload_file(
        &self,
        id: ProposalId,
        file: &FileUpload,
        mut on_progress: impl FnMut(u8),
    ) -> Result<UploadSummary, FundError> {
        if file.name.trim().is_empty() {
            return Err(FundError::Validation("file name must not be empty".into()));
        }
        if file.bytes.is_empty() {
            return Err(FundError::Validation(format!(
                "file {:?} is empty",
                file.name
            )));
        }

        let plan = plan_chunks(file.bytes.len());
        let total = plan.len() as u64;
        for (index, range) in plan.into_iter().enumerate() {
            let index = index as u64;
            let chunk = FileChunk {
                proposal_id: id,
                file_name: &file.name,
                bytes: &file.bytes[range],
                index,
                mime_type: &file.mime_type,
            };
            if let Err(e) = self.backend().upload_file_chunk(&chunk).await {
                tracing::warn!(
                    proposal = %id,
                    file = %file.name,
                    index,
                    total,
                    error = %e,
                    "chunk upload failed, aborting"
                );
                return Err(e);
            }
            tracing::debug!(proposal = %id, file = %file.name, index, total, "uploaded chunk");
            on_progress(progress_percent(index + 1, total));
        }

        tracing::info!(
            proposal = %id,
            file = %file.name,
            chunks = total,
            bytes = file.bytes.len(),
            "upload complete"
        );
        let files = self.list_files(id).await?;
        Ok(UploadSummary {
            file_name: file.name.clone(),
            total_chunks: total,
            bytes: file.bytes.len() as u64,
            files,
        })
    }

    /// Download and reassemble `file_name` from proposal `id`.
    pub async fn download_file(
        &self,
        id: ProposalId,
        file_name: &str,
        file_type: &str,
    ) -> Result<DownloadedFile, FundError> {
        let total = self.backend().file_total_chunks(id, file_name).await?;
        if total == 0 {
            return Err(FundError::NotFound(format!(
                "file {file_name:?} on proposal {id}"
            )));
        }

        let mut bytes = Vec::new();
        for index in 0..total {
            let chunk = self
                .backend()
                .file_chunk(id, file_name, index)
                .await?
                .ok_or_else(|| FundError::Integrity {
                    file: file_name.to_string(),
                    index,
                    total,
                })?;
            tracing::debug!(proposal = %id, file = file_name, index, total, "downloaded chunk");
            bytes.extend_from_slice(&chunk);
        }

        tracing::info!(
            proposal = %id,
            file = file_name,
            chunks = total,
            bytes = bytes.len(),
            "download complete"
        );
        let mime_type = if file_type.trim().is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            file_type.to_string()
        };
        Ok(DownloadedFile {
            name: file_name.to_string(),
            mime_type,
            bytes,
        })
    }

    /// Delete an attachment and return the backend's file list afterwards.
    pub async fn delete_file(
        &self,
        id: ProposalId,
        file_name: &str,
    ) -> Result<Vec<FileMeta>, FundError> {
        self.backend().delete_proposal_file(id, file_name).await?;
        tracing::info!(proposal = %id, file = file_name, "file deleted");
        self.list_files(id).await
    }

    /// Attachments of proposal `id` in backend order.
    pub async fn list_files(&self, id: ProposalId) -> Result<Vec<FileMeta>, FundError> {
        self.backend().proposal_files(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(data: &[u8]) -> Vec<u8> {
        plan_chunks(data.len())
            .into_iter()
            .flat_map(|r| data[r].to_vec())
            .collect()
    }

    #[test]
    fn chunk_size_is_500_kib() {
        assert_eq!(CHUNK_SIZE, 512_000);
    }

    #[test]
    fn boundary_sizes_split_and_reassemble() {
        let cases = [
            (0, 0),
            (1, 1),
            (CHUNK_SIZE - 1, 1),
            (CHUNK_SIZE, 1),
            (CHUNK_SIZE + 1, 2),
            (10 * CHUNK_SIZE + 37, 11),
        ];
        for (len, chunks) in cases {
            let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let plan = plan_chunks(len);
            assert_eq!(plan.len(), chunks, "len {len}");
            assert_eq!(total_chunks(len), chunks as u64, "len {len}");
            assert!(plan.iter().all(|r| r.len() <= CHUNK_SIZE));
            assert_eq!(reassemble(&data), data, "len {len}");
        }
    }

    #[test]
    fn chunks_are_contiguous() {
        let plan = plan_chunks(3 * CHUNK_SIZE + 5);
        for pair in plan.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(plan[0].start, 0);
        assert_eq!(plan.last().map(|r| r.end), Some(3 * CHUNK_SIZE + 5));
    }

    #[test]
    fn one_point_two_megabytes_makes_three_chunks() {
        let plan = plan_chunks(1_200_000);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[2].len(), 176_000);
        let progress: Vec<u8> = (1..=3).map(|i| progress_percent(i, 3)).collect();
        assert_eq!(progress, vec![33, 67, 100]);
    }

    #[test]
    fn progress_is_strictly_increasing_and_ends_at_100() {
        for total in 1..=120u64 {
            let steps: Vec<u8> = (1..=total).map(|i| progress_percent(i, total)).collect();
            assert_eq!(*steps.last().unwrap_or(&0), 100);
            assert!(steps[..steps.len() - 1].iter().all(|&p| p < 100), "total {total}");
            if total <= 100 {
                // Below 100 chunks every step moves the bar by at least 1%.
                assert!(steps.windows(2).all(|w| w[0] < w[1]), "total {total}");
            }
        }
    }

    #[test]
    fn large_uploads_hold_at_99_until_the_last_chunk() {
        assert_eq!(progress_percent(999, 1000), 99);
        assert_eq!(progress_percent(1000, 1000), 100);
    }

    #[test]
    fn mime_type_defaults_to_octet_stream() {
        assert_eq!(FileUpload::new("a.bin", None, vec![1]).mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(
            FileUpload::new("a.bin", Some(" ".into()), vec![1]).mime_type,
            DEFAULT_MIME_TYPE
        );
        assert_eq!(guess_mime_type(Path::new("report.PDF")), "application/pdf");
        assert_eq!(guess_mime_type(Path::new("noext")), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn file_names_lose_directory_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_file_name("a\\b.txt").unwrap(), "b.txt");
        assert!(sanitize_file_name("..").is_err());
        assert!(sanitize_file_name("dir/").is_err());
    }

    #[test]
    fn save_into_writes_the_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = DownloadedFile {
            name: "evidence.txt".into(),
            mime_type: "text/plain".into(),
            bytes: b"receipts".to_vec(),
        };
        let path = file.save_into(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("evidence.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"receipts");
        // Only the persisted file remains.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let file = DownloadedFile {
            name: "x".into(),
            mime_type: DEFAULT_MIME_TYPE.into(),
            bytes: vec![1, 2, 3],
        };
        assert!(matches!(file.save_into(&missing), Err(FundError::Validation(_))));
        assert!(!missing.join("x").exists());
    }
}
