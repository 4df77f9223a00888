// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::process::ExitCode;
use lazy_setup::config::{load_and_validate_plan, LifecycleBuilder};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <plan.yaml|plan.json|plan.toml> [plan ...]", args[0]);
        eprintln!("Example: {} configs/web-service.yaml", args[0]);
        eprintln!("Example: {} configs/web-service.yaml configs/failing-setup.json", args[0]);
        return ExitCode::FAILURE;
    }

    println!("🚀 Lazy Setup Rehearsal");
    println!("═══════════════════════");

    let mut failed = false;
    for (i, plan_file) in args[1..].iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(80));
        }

        if let Err(e) = run_plan(plan_file) {
            eprintln!("❌ {}: {:#}", plan_file, e);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        println!("\n🎉 All plans completed!");
        ExitCode::SUCCESS
    }
}

/// Load one plan, run its setup pass, then its teardown pass.
///
/// Teardown runs even when setup fails; the setup error is returned afterwards.
fn run_plan(plan_file: &str) -> anyhow::Result<()> {
    println!("📋 Plan: {}", plan_file);

    let plan = load_and_validate_plan(plan_file)
        .with_context(|| format!("could not load plan '{}'", plan_file))?;
    let mut lifecycle = LifecycleBuilder::from_plan(&plan);

    let setup_result = lifecycle.init();
    println!("\n⚙️  Setup order:");
    print_order(lifecycle.setup().execution_order());

    lifecycle.close();
    println!("\n🧹 Teardown order:");
    print_order(lifecycle.teardown().execution_order());

    setup_result.context("setup aborted")?;
    println!("\n✅ Setup and teardown completed");
    Ok(())
}

fn print_order(order: &[String]) {
    if order.is_empty() {
        println!("   (nothing ran)");
        return;
    }
    for (i, name) in order.iter().enumerate() {
        println!("   {}. {}", i + 1, name);
    }
}
