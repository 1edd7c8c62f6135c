//! Build-graph layering: `htn_kernel` ← `htn_search` ← `htn_harness`.
//!
//! Lower crates must not name higher crates in source or in their manifests.

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_path_buf()
}

fn walk(dir: &Path, forbidden: &[&str], violations: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, forbidden, violations);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            for (line_no, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.starts_with("//") {
                    continue;
                }
                if forbidden.iter().any(|p| trimmed.contains(p)) {
                    violations.push(format!("{}:{}: {trimmed}", path.display(), line_no + 1));
                }
            }
        }
    }
}

fn assert_layer(crate_dir: &str, forbidden_paths: &[&str], forbidden_packages: &[&str]) {
    let root = workspace_root().join(crate_dir);

    let mut violations = Vec::new();
    walk(&root.join("src"), forbidden_paths, &mut violations);
    if !violations.is_empty() {
        let mut msg = format!("{crate_dir} source reaches up the layering:\n");
        for v in &violations {
            let _ = writeln!(msg, "  {v}");
        }
        panic!("{msg}");
    }

    let manifest = fs::read_to_string(root.join("Cargo.toml")).unwrap();
    for package in forbidden_packages {
        assert!(
            !manifest.contains(package),
            "{crate_dir}/Cargo.toml depends on {package}"
        );
    }
}

#[test]
fn kernel_depends_on_nothing_above_it() {
    assert_layer(
        "kernel",
        &["htn_search", "htn_harness"],
        &["htn-search", "htn-harness", "serde", "tracing"],
    );
}

#[test]
fn search_does_not_depend_on_harness() {
    assert_layer("search", &["htn_harness"], &["htn-harness"]);
}
