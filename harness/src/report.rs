//! In-memory plan report: the output of a harness run.
//!
//! No file I/O in this module (see [`crate::report_dir`] for persistence).
//!
//! # Artifacts
//!
//! - `trace.json`: the `PlanTraceV1` decision trace (always present)
//! - `plan.json`: the `PlanRecordV1` steps (present only when a plan was found)
//! - `verification.json`: the runner's `VerificationV1` verdict, binding the
//!   trace and plan digests
//!
//! The manifest lists every artifact with its content hash in name order. The
//! report digest is `canonical_hash(ReportDigest, manifest)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use htn_kernel::proof::hash::{canonical_hash, ContentHash};
use htn_kernel::proof::hash_domain::HashDomain;

pub const PLAN_ARTIFACT: &str = "plan.json";
pub const TRACE_ARTIFACT: &str = "trace.json";
pub const VERIFICATION_ARTIFACT: &str = "verification.json";

pub const MANIFEST_SCHEMA_VERSION: &str = "report.v1";
pub const VERIFICATION_SCHEMA_VERSION: &str = "verification.v1";

/// A single artifact in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    /// Logical filename (e.g., `"trace.json"`).
    pub name: String,
    pub content: Vec<u8>,
    /// `canonical_hash(ReportArtifact, content)`.
    pub content_hash: ContentHash,
}

/// The complete report from a harness run.
#[derive(Debug, Clone)]
pub struct PlanReportV1 {
    /// Artifacts indexed by logical name, in sorted order.
    pub artifacts: BTreeMap<String, ReportArtifact>,
    /// JSON `ReportManifestV1` bytes.
    pub manifest: Vec<u8>,
    /// `canonical_hash(ReportDigest, manifest)`.
    pub digest: ContentHash,
}

impl PlanReportV1 {
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&ReportArtifact> {
        self.artifacts.get(name)
    }
}

/// Manifest schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportManifestV1 {
    pub schema_version: String,
    pub artifacts: Vec<ManifestEntryV1>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntryV1 {
    pub name: String,
    pub content_hash: String,
}

/// Runner verdict stored as `verification.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationV1 {
    pub schema_version: String,
    pub world_id: String,
    pub outcome: RunOutcomeV1,
    /// `PlanTraceV1::digest()` of `trace.json`.
    pub trace_digest: String,
    /// `PlanRecordV1::digest()` of `plan.json`, if a plan was found.
    pub plan_digest: Option<String>,
    /// The plan replayed from the start state without a rejected step.
    pub replay_verified: bool,
    /// The replayed final state satisfies the world goal.
    pub goal_satisfied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunOutcomeV1 {
    PlanFound {
        step_count: u64,
    },
    NoPlan {
        unresolved_task_names: Vec<String>,
        depth_bound_reached: bool,
    },
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Error building a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportBuildError {
    #[error("duplicate artifact: {name}")]
    DuplicateArtifact { name: String },
    #[error("manifest serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Build a `PlanReportV1` from `(name, content)` pairs.
///
/// # Errors
///
/// Returns [`ReportBuildError`] on a repeated artifact name or if the manifest
/// cannot be serialized.
pub fn build_report(artifacts: Vec<(String, Vec<u8>)>) -> Result<PlanReportV1, ReportBuildError> {
    let mut artifact_map = BTreeMap::new();
    for (name, content) in artifacts {
        if artifact_map.contains_key(&name) {
            return Err(ReportBuildError::DuplicateArtifact { name });
        }
        let content_hash = canonical_hash(HashDomain::ReportArtifact, &content);
        artifact_map.insert(
            name.clone(),
            ReportArtifact {
                name,
                content,
                content_hash,
            },
        );
    }

    let manifest = compute_manifest_bytes(&artifact_map)?;
    let digest = canonical_hash(HashDomain::ReportDigest, &manifest);

    Ok(PlanReportV1 {
        artifacts: artifact_map,
        manifest,
        digest,
    })
}

pub(crate) fn compute_manifest_bytes(
    artifacts: &BTreeMap<String, ReportArtifact>,
) -> Result<Vec<u8>, serde_json::Error> {
    let manifest = ReportManifestV1 {
        schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
        artifacts: artifacts
            .values()
            .map(|a| ManifestEntryV1 {
                name: a.name.clone(),
                content_hash: a.content_hash.as_str().to_string(),
            })
            .collect(),
    };
    serde_json::to_vec(&manifest)
}

// ---------------------------------------------------------------------------
// Verify
// ---------------------------------------------------------------------------

/// Error from report integrity verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportVerifyError {
    #[error("content hash mismatch for {artifact}: expected {expected}, actual {actual}")]
    ContentHashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
    #[error("manifest does not match artifacts")]
    ManifestMismatch,
    #[error("report digest mismatch: expected {expected}, actual {actual}")]
    DigestMismatch { expected: String, actual: String },
    #[error("missing artifact: {name}")]
    MissingArtifact { name: String },
    #[error("verification.json is invalid: {detail}")]
    VerificationParse { detail: String },
    #[error("trace digest mismatch: declared {declared}, recomputed {recomputed}")]
    TraceDigestMismatch {
        declared: String,
        recomputed: String,
    },
    #[error("plan digest mismatch: declared {declared}, recomputed {recomputed}")]
    PlanDigestMismatch {
        declared: String,
        recomputed: String,
    },
    #[error("plan.json present but verification declares no plan")]
    PlanArtifactUnexpected,
}

/// Verify report integrity: artifact hashes, manifest, digest, and the digest
/// bindings declared in `verification.json`.
///
/// # Errors
///
/// Returns the first [`ReportVerifyError`] found.
pub fn verify_report(report: &PlanReportV1) -> Result<(), ReportVerifyError> {
    for artifact in report.artifacts.values() {
        let recomputed = canonical_hash(HashDomain::ReportArtifact, &artifact.content);
        if recomputed != artifact.content_hash {
            return Err(ReportVerifyError::ContentHashMismatch {
                artifact: artifact.name.clone(),
                expected: artifact.content_hash.as_str().to_string(),
                actual: recomputed.as_str().to_string(),
            });
        }
    }

    let manifest = compute_manifest_bytes(&report.artifacts)
        .map_err(|_| ReportVerifyError::ManifestMismatch)?;
    if manifest != report.manifest {
        return Err(ReportVerifyError::ManifestMismatch);
    }

    let digest = canonical_hash(HashDomain::ReportDigest, &report.manifest);
    if digest != report.digest {
        return Err(ReportVerifyError::DigestMismatch {
            expected: report.digest.as_str().to_string(),
            actual: digest.as_str().to_string(),
        });
    }

    let verification = require(report, VERIFICATION_ARTIFACT)?;
    let verification: VerificationV1 = serde_json::from_slice(&verification.content)
        .map_err(|e| ReportVerifyError::VerificationParse {
            detail: e.to_string(),
        })?;
    if verification.schema_version != VERIFICATION_SCHEMA_VERSION {
        return Err(ReportVerifyError::VerificationParse {
            detail: format!("unknown schema_version {}", verification.schema_version),
        });
    }

    let trace = require(report, TRACE_ARTIFACT)?;
    let trace_digest = canonical_hash(HashDomain::PlanTrace, &trace.content);
    if trace_digest.as_str() != verification.trace_digest {
        return Err(ReportVerifyError::TraceDigestMismatch {
            declared: verification.trace_digest,
            recomputed: trace_digest.as_str().to_string(),
        });
    }

    match (report.artifact(PLAN_ARTIFACT), verification.plan_digest) {
        (Some(plan), Some(declared)) => {
            let recomputed = canonical_hash(HashDomain::PlanRecord, &plan.content);
            if recomputed.as_str() != declared {
                return Err(ReportVerifyError::PlanDigestMismatch {
                    declared,
                    recomputed: recomputed.as_str().to_string(),
                });
            }
        }
        (None, Some(_)) => {
            return Err(ReportVerifyError::MissingArtifact {
                name: PLAN_ARTIFACT.to_string(),
            });
        }
        (Some(_), None) => return Err(ReportVerifyError::PlanArtifactUnexpected),
        (None, None) => {}
    }

    Ok(())
}

fn require<'r>(report: &'r PlanReportV1, name: &str) -> Result<&'r ReportArtifact, ReportVerifyError> {
    report
        .artifact(name)
        .ok_or_else(|| ReportVerifyError::MissingArtifact {
            name: name.to_string(),
        })
}
