//! `htn-plan`: run a world through the HTN planner and print the plan.
//!
//! ```text
//! htn-plan --world baxter-swap
//! htn-plan --problem problem.json --max-depth 100 --out report/
//! RUST_LOG=htn_search=trace htn-plan --world blocks-world --steps
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use htn_harness::contract::HtnWorld;
use htn_harness::problem::{LoadedProblem, ProblemFileV1};
use htn_harness::report_dir::write_report_dir;
use htn_harness::runner::run_world;
use htn_harness::worlds::baxter_swap::BaxterSwapWorld;
use htn_harness::worlds::blocks_world::BlocksWorld;
use htn_search::policy::{PlannerPolicy, DEFAULT_MAX_DEPTH};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WorldKind {
    /// Two-handed robot swapping blocks between tables
    BaxterSwap,
    /// Single-hand block stacking
    BlocksWorld,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Hierarchical task network planner")]
struct Args {
    /// Built-in problem to run (ignored when --problem is given)
    #[arg(long, value_enum, default_value = "baxter-swap")]
    world: WorldKind,
    /// JSON problem file describing a world and its start/goal facts
    #[arg(long)]
    problem: Option<PathBuf>,
    /// Deepest recursion level the search may enter
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,
    /// Write the content-addressed report to this directory
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also print one JSON executor message per step
    #[arg(long)]
    steps: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let policy = PlannerPolicy::with_max_depth(args.max_depth);

    if let Some(path) = &args.problem {
        let problem = ProblemFileV1::load(path)
            .with_context(|| format!("load problem {}", path.display()))?;
        return match problem.into_world().context("build world")? {
            LoadedProblem::BaxterSwap(world) => execute(&world, &policy, &args),
            LoadedProblem::BlocksWorld(world) => execute(&world, &policy, &args),
        };
    }

    match args.world {
        WorldKind::BaxterSwap => execute(&BaxterSwapWorld::swap_problem(), &policy, &args),
        WorldKind::BlocksWorld => execute(&BlocksWorld::stacking_problem(), &policy, &args),
    }
}

fn execute<W: HtnWorld>(world: &W, policy: &PlannerPolicy, args: &Args) -> Result<ExitCode> {
    let run = run_world(world, policy).with_context(|| format!("run {}", world.world_id()))?;

    if let Some(dir) = &args.out {
        write_report_dir(&run.report, dir)
            .with_context(|| format!("write report to {}", dir.display()))?;
        info!(dir = %dir.display(), digest = %run.report.digest, "report written");
    }

    match &run.result {
        Ok(plan) => {
            print!("{}", plan.render_actions());
            if args.steps {
                for message in plan.step_messages() {
                    println!("{}", serde_json::to_string(&message)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            println!("Plan cannot be formulated");
            if failure.depth_bound_reached {
                eprintln!(
                    "depth bound {} was reached; a larger --max-depth may help",
                    policy.max_depth
                );
            }
            if failure.is_missing_domain_knowledge() {
                eprintln!(
                    "no operator or method for: {}",
                    failure.unresolved_task_names.join(", ")
                );
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
