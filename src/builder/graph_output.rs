// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! DOT rendering of a built chain.
//!
//! Start steps share one rank and end steps another, so the rendered graph
//! reads left to right from the steps that run first. Every edge points from
//! a dependent to the step it waits on.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::Path;

use crate::engine::Chain;

/// Renders `chain` as a Graphviz digraph.
pub fn render_dot(chain: &Chain) -> String {
    let steps = chain.steps();
    let mut dot = String::from("digraph {\n");
    dot.push_str("    node [shape=rectangle];\n");
    dot.push_str("    rankdir=LR;\n\n");

    let starts: BTreeSet<usize> = chain.start_steps().iter().copied().collect();
    dot.push_str(&rank_group(chain, starts.iter().copied()));

    let ends = (0..steps.len())
        .filter(|index| steps[*index].dependents().is_empty() && !starts.contains(index));
    dot.push_str(&rank_group(chain, ends));
    dot.push('\n');

    let mut printed = HashSet::new();
    let mut queue: VecDeque<usize> = starts.iter().copied().collect();
    while let Some(current) = queue.pop_front() {
        if !printed.insert(current) {
            continue;
        }
        for &dependent in steps[current].dependents() {
            dot.push_str(&format!(
                "    {} -> {};\n",
                quote(steps[dependent].id()),
                quote(steps[current].id())
            ));
            queue.push_back(dependent);
        }
    }

    dot.push_str("}\n");
    dot
}

/// Writes the DOT rendering of `chain` to `path`.
pub fn write_graph(path: impl AsRef<Path>, chain: &Chain) -> io::Result<()> {
    fs::write(path, render_dot(chain))
}

/// One `{ rank = same; ... }` line, or nothing when `positions` is empty.
fn rank_group(chain: &Chain, positions: impl Iterator<Item = usize>) -> String {
    let members: Vec<String> = positions
        .map(|position| format!(" {};", quote(chain.steps()[position].id())))
        .collect();
    if members.is_empty() {
        return String::new();
    }
    format!("    {{ rank = same;{} }}\n", members.concat())
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ChainBuilder;
    use crate::item::{BuildItem, ItemKind};
    use crate::traits::step_fn;

    struct Parsed;
    impl BuildItem for Parsed {
        const KIND: ItemKind = ItemKind::Simple;
    }

    struct Linted;
    impl BuildItem for Linted {
        const KIND: ItemKind = ItemKind::Simple;
    }

    struct Compiled;
    impl BuildItem for Compiled {
        const KIND: ItemKind = ItemKind::Simple;
    }

    struct Part;
    impl BuildItem for Part {
        const KIND: ItemKind = ItemKind::NamedSimple;
    }

    fn diamond() -> Chain {
        let mut builder = ChainBuilder::new();
        builder
            .add_build_step(step_fn("parse", |_| Ok(())))
            .produces::<Parsed>()
            .unwrap();
        builder
            .add_build_step(step_fn("lint", |_| Ok(())))
            .consumes::<Parsed>()
            .unwrap()
            .produces::<Linted>()
            .unwrap();
        builder
            .add_build_step(step_fn("compile", |_| Ok(())))
            .consumes::<Parsed>()
            .unwrap()
            .consumes::<Linted>()
            .unwrap()
            .produces::<Compiled>()
            .unwrap();
        builder.add_final_item::<Compiled>().unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_render_dot_edges_point_at_dependencies() {
        let dot = render_dot(&diamond());

        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("{ rank = same; \"parse\"; }"));
        assert!(dot.contains("{ rank = same; \"compile\"; }"));
        assert!(dot.contains("\"lint\" -> \"parse\";"));
        assert!(dot.contains("\"compile\" -> \"parse\";"));
        assert!(dot.contains("\"compile\" -> \"lint\";"));
    }

    #[test]
    fn test_render_dot_prints_each_edge_once() {
        let dot = render_dot(&diamond());
        assert_eq!(dot.matches("\"compile\" -> \"lint\";").count(), 1);
    }

    #[test]
    fn test_render_dot_groups_every_start_step() {
        let mut builder = ChainBuilder::new();
        for id in ["parse-left", "parse-right"] {
            builder
                .add_build_step(step_fn(id, |_| Ok(())))
                .produces_named::<Part>(id)
                .unwrap();
        }
        builder
            .add_build_step(step_fn("join", |_| Ok(())))
            .consumes_named::<Part>("parse-left")
            .unwrap()
            .consumes_named::<Part>("parse-right")
            .unwrap()
            .produces::<Compiled>()
            .unwrap();
        builder.add_final_item::<Compiled>().unwrap();

        let dot = render_dot(&builder.build().unwrap());
        let starts = dot
            .lines()
            .find(|line| line.contains("\"parse-left\";"))
            .unwrap();
        assert!(starts.starts_with("    { rank = same;"));
        assert!(starts.contains(" \"parse-right\";"));
        assert!(starts.ends_with(" }"));
        assert!(dot.contains("    { rank = same; \"join\"; }\n"));
    }

    #[test]
    fn test_render_dot_of_empty_chain_has_no_rank_groups() {
        let dot = render_dot(&ChainBuilder::new().build().unwrap());
        assert!(!dot.contains("rank = same"));
        assert!(!dot.contains("->"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_write_graph_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chain.dot");
        assert!(write_graph(&path, &diamond()).is_err());
    }
}
