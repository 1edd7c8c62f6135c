//! Report directory persistence: write/read/verify `PlanReportV1` on disk.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   report_manifest.json   (ReportManifestV1 JSON)
//!   report_digest.txt      (ASCII digest string, e.g. "sha256:...")
//!   trace.json
//!   plan.json              (only when a plan was found)
//!   verification.json
//! ```
//!
//! The directory path is never part of any hash surface. The manifest's
//! declared list is the source of truth.
//!
//! # Fail-closed semantics
//!
//! - Missing declared artifact files → error
//! - Extra undeclared files → error
//! - Stored digest differs from the recomputed manifest digest → error

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use htn_kernel::proof::hash::{canonical_hash, ContentHash};
use htn_kernel::proof::hash_domain::HashDomain;

use crate::report::{
    verify_report, PlanReportV1, ReportArtifact, ReportManifestV1, ReportVerifyError,
    MANIFEST_SCHEMA_VERSION,
};

const MANIFEST_FILENAME: &str = "report_manifest.json";
const DIGEST_FILENAME: &str = "report_digest.txt";

const METADATA_FILENAMES: &[&str] = &[MANIFEST_FILENAME, DIGEST_FILENAME];

/// Error writing, reading or verifying a report directory.
#[derive(Debug, thiserror::Error)]
pub enum ReportDirError {
    #[error("I/O error: {detail}")]
    Io { detail: String },
    #[error("missing metadata file: {filename}")]
    MissingMetadata { filename: String },
    #[error("missing artifact: {name}")]
    MissingArtifact { name: String },
    #[error("undeclared extra file: {name}")]
    ExtraFile { name: String },
    #[error("manifest parse error: {detail}")]
    ManifestParse { detail: String },
    #[error("manifest version mismatch: {found}")]
    ManifestVersionMismatch { found: String },
    #[error("manifest entry invalid: {detail}")]
    ManifestEntryInvalid { detail: String },
    #[error("digest mismatch: stored={stored}, recomputed={recomputed}")]
    DigestMismatch { stored: String, recomputed: String },
    #[error("verify error: {0}")]
    Verify(#[from] ReportVerifyError),
}

/// Write a report to `dir`, creating it if needed.
///
/// Regular files left in `dir` that the new manifest does not declare are
/// removed first, so a directory can be reused across runs whose artifact
/// sets differ.
///
/// # Errors
///
/// Returns [`ReportDirError::Io`] on any write or removal failure.
pub fn write_report_dir(report: &PlanReportV1, dir: &Path) -> Result<(), ReportDirError> {
    std::fs::create_dir_all(dir).map_err(|e| ReportDirError::Io {
        detail: format!("create_dir_all {}: {e}", dir.display()),
    })?;

    for filename in list_files(dir)? {
        if !report.artifacts.contains_key(&filename)
            && !METADATA_FILENAMES.contains(&filename.as_str())
        {
            let path = dir.join(&filename);
            std::fs::remove_file(&path).map_err(|e| ReportDirError::Io {
                detail: format!("remove stale {}: {e}", path.display()),
            })?;
        }
    }

    for artifact in report.artifacts.values() {
        write_atomic(&dir.join(&artifact.name), &artifact.content)?;
    }
    write_atomic(&dir.join(MANIFEST_FILENAME), &report.manifest)?;
    write_atomic(&dir.join(DIGEST_FILENAME), report.digest.as_str().as_bytes())?;
    Ok(())
}

/// Read a report directory.
///
/// The stored `report_digest.txt` is checked against the digest recomputed
/// from the stored manifest. Artifact hashes are taken from the manifest; use
/// [`verify_report_dir`] to also recompute them.
///
/// # Errors
///
/// Returns [`ReportDirError`] on any validation failure.
pub fn read_report_dir(dir: &Path) -> Result<PlanReportV1, ReportDirError> {
    let manifest_bytes = read_required(dir, MANIFEST_FILENAME)?;
    let digest_bytes = read_required(dir, DIGEST_FILENAME)?;

    let manifest: ReportManifestV1 =
        serde_json::from_slice(&manifest_bytes).map_err(|e| ReportDirError::ManifestParse {
            detail: e.to_string(),
        })?;
    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(ReportDirError::ManifestVersionMismatch {
            found: manifest.schema_version,
        });
    }

    let mut artifacts = BTreeMap::new();
    for entry in manifest.artifacts {
        if entry.name.is_empty()
            || entry.name.contains(['/', '\\'])
            || entry.name.starts_with('.')
            || METADATA_FILENAMES.contains(&entry.name.as_str())
        {
            return Err(ReportDirError::ManifestEntryInvalid {
                detail: format!("illegal artifact name {:?}", entry.name),
            });
        }
        let content_hash = ContentHash::parse(&entry.content_hash).ok_or_else(|| {
            ReportDirError::ManifestEntryInvalid {
                detail: format!(
                    "invalid content_hash format for {}: {}",
                    entry.name, entry.content_hash
                ),
            }
        })?;
        let content = std::fs::read(dir.join(&entry.name)).map_err(|_| {
            ReportDirError::MissingArtifact {
                name: entry.name.clone(),
            }
        })?;
        artifacts.insert(
            entry.name.clone(),
            ReportArtifact {
                name: entry.name,
                content,
                content_hash,
            },
        );
    }

    for filename in list_files(dir)? {
        if !artifacts.contains_key(&filename) && !METADATA_FILENAMES.contains(&filename.as_str()) {
            return Err(ReportDirError::ExtraFile { name: filename });
        }
    }

    let recomputed = canonical_hash(HashDomain::ReportDigest, &manifest_bytes);
    let stored = String::from_utf8_lossy(&digest_bytes).trim().to_string();
    if recomputed.as_str() != stored {
        return Err(ReportDirError::DigestMismatch {
            stored,
            recomputed: recomputed.as_str().to_string(),
        });
    }

    Ok(PlanReportV1 {
        artifacts,
        manifest: manifest_bytes,
        digest: recomputed,
    })
}

/// Read a report directory, then run [`verify_report`].
///
/// # Errors
///
/// Returns [`ReportDirError`] on read failure or integrity mismatch.
pub fn verify_report_dir(dir: &Path) -> Result<PlanReportV1, ReportDirError> {
    let report = read_report_dir(dir)?;
    verify_report(&report)?;
    Ok(report)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Temp file + rename.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ReportDirError> {
    let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(ReportDirError::Io {
            detail: format!("not a file path: {}", path.display()),
        });
    };
    let temp_path = dir.join(format!(".tmp_{}", file_name.to_string_lossy()));

    std::fs::write(&temp_path, content).map_err(|e| ReportDirError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| ReportDirError::Io {
        detail: format!("rename {} → {}: {e}", temp_path.display(), path.display()),
    })
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, ReportDirError> {
    std::fs::read(dir.join(filename)).map_err(|_| ReportDirError::MissingMetadata {
        filename: filename.to_string(),
    })
}

/// Regular files in `dir`, skipping leftover `.tmp_` files.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, ReportDirError> {
    let io = |e: std::io::Error| ReportDirError::Io {
        detail: format!("read_dir {}: {e}", dir.display()),
    };
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let entry = entry.map_err(io)?;
        if !entry.file_type().map_err(io)?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with(".tmp_") {
                files.insert(name.to_string());
            }
        }
    }
    Ok(files)
}
