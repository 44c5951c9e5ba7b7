// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;

use buildchain::builder::{render_dot, ChainBuilder};
use buildchain::config::{load_config, EngineConfig};
use buildchain::declaration::{ProduceFlag, ProduceFlags};
use buildchain::engine::Chain;
use buildchain::item::{natural_order, BuildItem, ItemComparator, ItemKind};
use buildchain::traits::step_fn;

/// Name of the project being "built"; supplied by the caller.
struct ProjectName(String);
impl BuildItem for ProjectName {
    const KIND: ItemKind = ItemKind::Simple;
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct SourceFile(String);
impl BuildItem for SourceFile {
    const KIND: ItemKind = ItemKind::Multi;

    fn comparator() -> Option<ItemComparator> {
        Some(natural_order::<Self>)
    }
}

struct LintReport(usize);
impl BuildItem for LintReport {
    const KIND: ItemKind = ItemKind::Simple;
}

struct Artifact(String);
impl BuildItem for Artifact {
    const KIND: ItemKind = ItemKind::Simple;
}

struct Package(String);
impl BuildItem for Package {
    const KIND: ItemKind = ItemKind::Simple;
}

struct Docs;
impl BuildItem for Docs {
    const KIND: ItemKind = ItemKind::Simple;
}

fn sample_chain(config: &EngineConfig) -> anyhow::Result<Chain> {
    let mut builder = ChainBuilder::with_config(config);
    builder.add_initial_item::<ProjectName>()?;

    let scans: [(&str, &'static [&'static str]); 2] = [
        ("scan-src", &["src/main.rs", "src/lib.rs"]),
        ("scan-tests", &["tests/smoke.rs"]),
    ];
    for (id, files) in scans {
        builder
            .add_build_step(step_fn(id, move |context| {
                for file in files {
                    context.produce(SourceFile(file.to_string()))?;
                }
                Ok(())
            }))
            .produces::<SourceFile>()?;
    }

    builder
        .add_build_step(step_fn("lint", |context| {
            let sources = context.consume_multi::<SourceFile>()?;
            for source in sources.iter().filter(|s| s.0.starts_with("tests/")) {
                context.warn_at(source.0.clone(), "test file has no assertions");
            }
            context.produce(LintReport(sources.len()))?;
            Ok(())
        }))
        .consumes::<SourceFile>()?
        .produces::<LintReport>()?;

    builder
        .add_build_step(step_fn("compile", |context| {
            let name = context
                .consume::<ProjectName>()?
                .map(|name| name.0.clone())
                .unwrap_or_else(|| "unnamed".to_string());
            let sources = context.consume_multi::<SourceFile>()?;
            context.note(format!("compiling {} sources", sources.len()));
            context.produce(Artifact(format!("{name}.bin")))?;
            Ok(())
        }))
        .consumes::<ProjectName>()?
        .consumes::<SourceFile>()?
        .produces::<Artifact>()?;

    builder
        .add_build_step(step_fn("default-package", |context| {
            context.produce(Package("empty.tar".to_string()))?;
            Ok(())
        }))
        .produces_with::<Package>(ProduceFlags::of(ProduceFlag::Overridable))?;

    builder
        .add_build_step(step_fn("package", |context| {
            let artifact = context.consume::<Artifact>()?;
            let linted = context.consume::<LintReport>()?.map_or(0, |report| report.0);
            let artifact = artifact.map(|a| a.0.clone()).unwrap_or_default();
            context.produce(Package(format!("{artifact}.tar ({linted} files linted)")))?;
            Ok(())
        }))
        .consumes::<Artifact>()?
        .consumes_optional::<LintReport>()?
        .produces::<Package>()?;

    builder
        .add_build_step(step_fn("docs", |context| {
            context.produce(Docs)?;
            Ok(())
        }))
        .produces::<Docs>()?;

    builder.add_final_item::<Package>()?;
    Ok(builder.build()?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("buildchain=info".parse()?),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let print_dot = args.iter().any(|arg| arg == "--dot");
    let config = match args.iter().skip(1).find(|arg| !arg.starts_with("--")) {
        Some(path) => load_config(PathBuf::from(path))?,
        None => EngineConfig::default(),
    };

    let chain = sample_chain(&config)?;
    if print_dot {
        print!("{}", render_dot(&chain));
        return Ok(());
    }

    let runtime = config.executor_options.build_runtime()?;
    let mut execution = chain.execution_builder("demo");
    execution
        .failure_strategy(config.failure_strategy)
        .produce(ProjectName("buildchain-demo".to_string()))?;
    let result = execution.execute(runtime.handle()).wait_blocking()?;

    println!(
        "Build '{}' {} in {:?}",
        result.build_target_name(),
        if result.is_success() { "succeeded" } else { "failed" },
        result.duration()
    );
    for diagnostic in result.diagnostics() {
        println!("  {}", diagnostic);
    }
    if let Some(package) = result.consume::<Package>()? {
        println!("Package: {}", package.0);
    }

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
