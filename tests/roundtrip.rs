//! Printing a parsed fixture and parsing it again must be stable.
//!
//! Run with: cargo test --test roundtrip

use libtest_mimic::{Arguments, Failed, Trial};
use scaffold_mutate::format_source;
use std::fs;
use std::path::{Path, PathBuf};

fn collect_fixtures() -> Vec<PathBuf> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let mut files = Vec::new();
    for extension in ["go", "proto"] {
        let pattern = format!("{}/**/*.{}", root.display(), extension);
        files.extend(glob::glob(&pattern).expect("valid glob pattern").filter_map(Result::ok));
    }
    files.sort();
    files
}

fn check(path: &Path) -> Result<(), Failed> {
    let source = fs::read_to_string(path).map_err(|err| format!("{}: {}", path.display(), err))?;
    let display = path.display().to_string();
    let first = format_source(&source, path).map_err(|err| err.render(&source, &display))?;
    let second = format_source(&first, path).map_err(|err| err.render(&first, &display))?;
    if first != second {
        return Err(format!("printing is not stable\n--- first ---\n{}\n--- second ---\n{}", first, second).into());
    }
    Ok(())
}

fn main() {
    let args = Arguments::from_args();
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");

    let trials = collect_fixtures()
        .into_iter()
        .map(|path| {
            let name = path.strip_prefix(&root).unwrap_or(&path).to_string_lossy().replace('\\', "/");
            Trial::test(name, move || check(&path))
        })
        .collect();

    libtest_mimic::run(&args, trials).exit();
}
