//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. Canonical domain set has expected count (catches forgotten additions to ALL)
//! 2. All domain byte strings are unique
//! 3. All domains are null-terminated
//! 4. All domains follow `HTN::*::V1\0` naming
//! 5. No raw `HTN::` domain literals in production source outside `hash_domain.rs`
//! 6. No `deny_unknown_fields` in production source

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use htn_kernel::proof::hash_domain::HashDomain;

const PRODUCTION_DIRS: [&str; 3] = [
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../kernel/src"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../search/src"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../harness/src"),
];

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        4,
        "expected 4 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_all_unique_bytes() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(
            seen.insert(domain.as_bytes()),
            "duplicate domain bytes: {domain}"
        );
    }
}

#[test]
fn hash_domain_all_null_terminated() {
    for domain in HashDomain::ALL {
        assert!(
            domain.as_bytes().ends_with(&[0]),
            "{domain} is not null-terminated"
        );
    }
}

#[test]
fn hash_domain_all_follow_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(bytes.starts_with(b"HTN::"), "{domain} does not start with HTN::");
        assert!(bytes.ends_with(b"::V1\0"), "{domain} does not end with ::V1\\0");
    }
}

#[test]
fn no_raw_domain_literals_outside_authority() {
    let violations = scan_production("b\"HTN::", Some("hash_domain.rs"));
    assert!(
        violations.is_empty(),
        "raw HTN:: domain literals found outside hash_domain.rs:\n{}",
        violations.join("\n")
    );
}

/// `deny_unknown_fields` breaks forward-compatible reading of V1 artifacts.
#[test]
fn no_deny_unknown_fields_in_production_code() {
    let violations = scan_production("deny_unknown_fields", None);
    assert!(
        violations.is_empty(),
        "deny_unknown_fields found in production code:\n{}",
        violations.join("\n")
    );
}

// ---------------------------------------------------------------------------
// Source scanning
// ---------------------------------------------------------------------------

fn scan_production(pattern: &str, authority_file: Option<&str>) -> Vec<String> {
    let mut violations = Vec::new();
    for dir in PRODUCTION_DIRS {
        let dir = Path::new(dir);
        assert!(dir.is_dir(), "production dir missing: {}", dir.display());
        for path in rust_files(dir) {
            if authority_file.is_some()
                && path.file_name().and_then(|n| n.to_str()) == authority_file
            {
                continue;
            }
            let content = std::fs::read_to_string(&path).unwrap();
            scan_file(&path, &content, pattern, &mut violations);
        }
    }
    violations
}

/// Flags non-comment lines containing `pattern`, skipping `#[cfg(test)]`
/// blocks via brace-depth tracking.
fn scan_file(path: &Path, content: &str, pattern: &str, violations: &mut Vec<String>) {
    let mut brace_depth: usize = 0;
    let mut skip_depth: Option<usize> = None;
    let mut cfg_test_pending = false;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.contains("#[cfg(test)]") {
            cfg_test_pending = true;
            continue;
        }

        let opens = line.chars().filter(|&c| c == '{').count();
        let closes = line.chars().filter(|&c| c == '}').count();
        if cfg_test_pending && opens > 0 {
            skip_depth = Some(brace_depth);
            cfg_test_pending = false;
        }
        brace_depth = brace_depth.saturating_add(opens).saturating_sub(closes);

        if let Some(depth) = skip_depth {
            if brace_depth <= depth {
                skip_depth = None;
            }
            continue;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        if trimmed.contains(pattern) {
            violations.push(format!("  {}:{}: {}", path.display(), i + 1, trimmed));
        }
    }
}

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(rust_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                results.push(path);
            }
        }
    }
    results
}
