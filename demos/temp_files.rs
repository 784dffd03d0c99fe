//! Scoped Temp Files Example
//!
//! Demonstrates scopes over real files:
//! - A single scope that creates a file and always deletes it
//! - A multi-file scope where a later acquisition fails
//! - A tuple scope mixing files with a plain configuration value
//! - Release failures that supersede a block failure

use std::io;
use std::path::PathBuf;

use ensconce::{from_fns, scope, scope_all, scope_each, Plain, Resource, ScopeError, Scoped};

/// A temp file that exists only for the length of a scope.
struct TempFile {
    path: PathBuf,
    contents: &'static str,
}

impl TempFile {
    fn new(name: &str, contents: &'static str) -> Self {
        TempFile {
            path: std::env::temp_dir().join(format!("ensconce_demo_{}.txt", name)),
            contents,
        }
    }
}

impl Resource for TempFile {
    type Acquired = PathBuf;
    type Error = io::Error;

    fn acquire(&self) -> Result<PathBuf, io::Error> {
        println!("  create {}", self.path.display());
        std::fs::write(&self.path, self.contents)?;
        Ok(self.path.clone())
    }

    fn release(&self) -> Result<(), io::Error> {
        println!("  remove {}", self.path.display());
        std::fs::remove_file(&self.path)
    }
}

// =============================================================================
// Example 1: Single scope
// =============================================================================

fn example_single() -> Result<(), ScopeError<io::Error>> {
    println!("\n=== Example 1: Single scope ===");

    let notes = TempFile::new("notes", "remember the milk");
    let text = scope(Scoped::managed(&notes), |path| std::fs::read_to_string(path))?;

    println!("  read: {:?}", text);
    println!("  exists after scope: {}", notes.path.exists());
    Ok(())
}

// =============================================================================
// Example 2: Partial acquisition
// =============================================================================

fn example_partial_failure() {
    println!("\n=== Example 2: Later acquisition fails ===");

    let first = TempFile::new("first", "1");
    let second = TempFile::new("second", "2");
    let missing = TempFile {
        path: std::env::temp_dir()
            .join("ensconce_demo_no_such_dir")
            .join("third.txt"),
        contents: "3",
    };

    let result = scope_all(
        vec![
            Scoped::managed(&first),
            Scoped::managed(&second),
            Scoped::managed(&missing),
        ],
        |paths| Ok(paths.len()),
    );

    match result {
        Err(err) => println!("  failed as expected: {}", err),
        Ok(n) => println!("  unexpectedly acquired {} files", n),
    }
    println!(
        "  first exists: {}, second exists: {}",
        first.path.exists(),
        second.path.exists()
    );
}

// =============================================================================
// Example 3: Tuple scope
// =============================================================================

fn example_tuple() -> Result<(), ScopeError<io::Error>> {
    println!("\n=== Example 3: Tuple scope with a plain value ===");

    let input = TempFile::new("input", "alpha beta gamma");
    let output = TempFile::new("output", "");

    let words = scope_each((&input, Plain(" | "), &output), |(src, sep, dst)| {
        let joined = std::fs::read_to_string(src)?
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(sep);
        std::fs::write(&dst, &joined)?;
        Ok::<_, io::Error>(joined)
    })?;

    println!("  wrote: {}", words);
    Ok(())
}

// =============================================================================
// Example 4: Release failure supersedes block failure
// =============================================================================

fn example_release_failure() {
    println!("\n=== Example 4: Release failure supersedes block failure ===");

    let flaky = from_fns(
        || Ok::<_, io::Error>("connection"),
        || Err(io::Error::other("socket already closed")),
    );

    let result: Result<(), _> = scope(Scoped::managed(&flaky), |_| {
        Err(io::Error::other("query timed out"))
    });

    if let Err(err) = result {
        println!("  observed: {}", err);
        if let Some(prev) = err.superseded() {
            println!("  superseded: {}", prev);
        }
    }
}

fn main() -> Result<(), ScopeError<io::Error>> {
    // Run with `--features tracing` to see acquire/release events
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("Scoped Temp Files Examples");
    println!("==========================");

    example_single()?;
    example_partial_failure();
    example_tuple()?;
    example_release_failure();

    println!("\n=== All examples completed ===");
    Ok(())
}
