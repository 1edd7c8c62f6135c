//! Cross-process determinism: spawn `plan_fixture` under several process
//! environments and assert byte-identical output.
//!
//! Planning, trace serialization and report digests must not depend on cwd,
//! locale, time zone or unrelated environment variables.

use std::path::Path;
use std::process::Command;

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// Run the fixture with the given cwd and environment overrides.
fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = env!("CARGO_BIN_EXE_plan_fixture");

    let mut command = Command::new(bin);
    command
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "plan_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_four_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);

    assert!(baseline.contains("world_id=baxter_swap\nstep_count=8\n"));
    assert!(baseline.contains("world_id=blocks_world\nstep_count=4\n"));
    assert_eq!(baseline.matches("report_digest=sha256:").count(), 2);

    let alt_cwd = std::env::temp_dir();
    let alt_cwd = alt_cwd.to_string_lossy();
    assert_eq!(
        baseline,
        run_variant(&alt_cwd, &[]),
        "output differs when cwd changes from {root} to {alt_cwd}"
    );

    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs when LC_ALL=C LANG=C"
    );

    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[
                ("HTN_NOISE", "should_not_matter"),
                ("TZ", "America/New_York"),
                ("HOME", "/nonexistent"),
            ],
        ),
        "output differs with spurious env vars (HTN_NOISE, TZ, HOME)"
    );
}

#[test]
fn crossproc_matches_in_process_run() {
    use htn_harness::runner::run_world;
    use htn_harness::worlds::baxter_swap::BaxterSwapWorld;
    use htn_search::policy::PlannerPolicy;

    let run = run_world(&BaxterSwapWorld::swap_problem(), &PlannerPolicy::default()).unwrap();
    let output = run_variant(&workspace_root(), &[]);
    let expected = format!("report_digest={}\n", run.report.digest.as_str());
    assert!(
        output.contains(&expected),
        "fixture digest differs from in-process digest {}",
        run.report.digest
    );
}
