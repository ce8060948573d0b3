//! Source-level checks for the review crate.
//!
//! The review crate must stay panic-free and IO-free: the host drives it from
//! an event loop and owns every side effect. Each pattern below has a budget
//! (zero unless noted). Budgets only ever go down.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

struct Rule {
    pattern: &'static str,
    budget: usize,
    why: &'static str,
}

const PANIC_RULES: &[Rule] = &[
    Rule { pattern: ".unwrap()", budget: 0, why: "propagate or default instead" },
    Rule { pattern: ".expect(", budget: 0, why: "propagate or default instead" },
    Rule { pattern: "panic!(", budget: 0, why: "return a ReviewError" },
    Rule { pattern: "unreachable!(", budget: 0, why: "model the state so it cannot occur" },
    Rule { pattern: "todo!(", budget: 0, why: "no stubs in shipped code" },
    Rule { pattern: "unimplemented!(", budget: 0, why: "no stubs in shipped code" },
];

const DISCARD_RULES: &[Rule] = &[
    Rule { pattern: "let _ =", budget: 0, why: "inspect the result" },
    Rule { pattern: ".ok()", budget: 0, why: "inspect the error" },
    Rule { pattern: "#[allow(dead_code)]", budget: 0, why: "delete unused code" },
];

const IO_RULES: &[Rule] = &[
    Rule { pattern: "std::fs", budget: 0, why: "the host owns file access" },
    Rule { pattern: "std::net", budget: 0, why: "the host owns the network" },
    Rule { pattern: "println!(", budget: 0, why: "the host owns output" },
    Rule { pattern: "eprintln!(", budget: 0, why: "the host owns output" },
    Rule { pattern: "std::thread", budget: 0, why: "the workspace is single-threaded" },
];

/// Production `.rs` files under `src/`, excluding `*_test.rs`.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Lines matching `pattern`, skipping comment lines so docs can name the patterns.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<String> {
    files
        .iter()
        .flat_map(|file| {
            file.content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim_start().starts_with("//"))
                .filter(|(_, line)| line.contains(pattern))
                .map(|(n, line)| format!("  {}:{}: {}", file.path, n + 1, line.trim()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn check(rules: &[Rule]) {
    let files = source_files();
    assert!(!files.is_empty(), "no source files found; run from the crate root");
    let mut failures = Vec::new();
    for rule in rules {
        let found = hits(&files, rule.pattern);
        if found.len() > rule.budget {
            failures.push(format!(
                "`{}` budget exceeded: found {}, max {} ({})\n{}",
                rule.pattern,
                found.len(),
                rule.budget,
                rule.why,
                found.join("\n")
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n\n"));
}

#[test]
fn no_panicking_calls() {
    check(PANIC_RULES);
}

#[test]
fn no_silently_discarded_results() {
    check(DISCARD_RULES);
}

#[test]
fn no_io_in_workspace_state() {
    check(IO_RULES);
}

#[test]
fn every_module_has_tests() {
    let files = source_files();
    let mut missing = Vec::new();
    for file in &files {
        let name = Path::new(&file.path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        if matches!(name.as_str(), "lib" | "consts" | "error") {
            continue;
        }
        let attached = format!("#[path = \"{name}_test.rs\"]");
        if !file.content.contains(&attached) {
            missing.push(file.path.clone());
        }
    }
    assert!(missing.is_empty(), "modules without a sibling test file:\n  {}", missing.join("\n  "));
}
