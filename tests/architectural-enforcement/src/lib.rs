//! Architectural Enforcement
//!
//! Source scanners behind the integration tests in `tests/`:
//! - No blocking I/O inside async functions
//! - No sleep() calls in production code
//!
//! The scanners are line-based heuristics. They classify each line by its
//! enclosing function and skip everything from the first `#[cfg(test)]`
//! onward, which is where every module in this workspace keeps its tests.

use std::fs;
use std::path::{Path, PathBuf};

/// One offending source line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What rule was broken
    pub rule: &'static str,
    /// The trimmed source line
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.text
        )
    }
}

/// Kind of function a line sits in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnContext {
    /// `async fn` (or an async block's enclosing async fn)
    Async,
    /// Plain `fn`
    Sync,
    /// Marked `#[test]` / `#[tokio::test]`, or inside the test module
    Test,
    /// Not inside any function (imports, items)
    Module,
}

/// Production source directories of the workspace, relative to its root
pub const PRODUCTION_DIRS: &[&str] = &["gallery/core/src", "gallery/cli/src"];

/// Workspace root, derived from this crate's manifest location
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir`
#[must_use]
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Source lines of `path`, empty if it cannot be read
#[must_use]
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Code portion of a line with any `//` comment removed
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

fn strip_visibility(line: &str) -> &str {
    let line = line.trim_start();
    if let Some(rest) = line.strip_prefix("pub(crate) ") {
        return rest;
    }
    if let Some(rest) = line.strip_prefix("pub(super) ") {
        return rest;
    }
    line.strip_prefix("pub ").unwrap_or(line)
}

fn is_fn_header(line: &str) -> Option<bool> {
    let rest = strip_visibility(line);
    if rest.starts_with("async fn ") {
        Some(true)
    } else if rest.starts_with("fn ") {
        Some(false)
    } else {
        None
    }
}

fn is_test_marker(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("#[test]") || line.starts_with("#[tokio::test")
}

/// Classify the function enclosing `lines[idx]`
#[must_use]
pub fn fn_context<S: AsRef<str>>(lines: &[S], idx: usize) -> FnContext {
    if lines[..=idx]
        .iter()
        .any(|l| l.as_ref().trim().starts_with("#[cfg(test)]"))
    {
        return FnContext::Test;
    }

    for i in (0..idx).rev() {
        let line = lines[i].as_ref();
        if let Some(is_async) = is_fn_header(line) {
            let marked = (0..i)
                .rev()
                .map(|j| lines[j].as_ref().trim())
                .take_while(|l| l.starts_with("#[") || l.starts_with("///"))
                .any(is_test_marker);
            return match (marked, is_async) {
                (true, _) => FnContext::Test,
                (false, true) => FnContext::Async,
                (false, false) => FnContext::Sync,
            };
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with("mod ") || trimmed.starts_with("impl") {
            return FnContext::Module;
        }
    }
    FnContext::Module
}

const BLOCKING_PATTERNS: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::io::stdin()", "Blocking stdin"),
    ("std::thread::sleep", "Blocking sleep"),
];

/// Blocking calls inside async functions of one file
#[must_use]
pub fn blocking_io_in_async<S: AsRef<str>>(path: &Path, lines: &[S]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let code = code_part(line.as_ref());
        for &(pattern, rule) in BLOCKING_PATTERNS {
            if code.contains(pattern) && fn_context(lines, idx) == FnContext::Async {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    rule,
                    text: line.as_ref().trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Sleep calls anywhere outside test code of one file
#[must_use]
pub fn sleeps_outside_tests<S: AsRef<str>>(path: &Path, lines: &[S]) -> Vec<Violation> {
    lines
        .iter()
        .enumerate()
        .filter(|(idx, line)| {
            let code = code_part(line.as_ref());
            (code.contains("::sleep(") || code.contains(".sleep(") || code.contains("sleep_until("))
                && fn_context(lines, *idx) != FnContext::Test
        })
        .map(|(idx, line)| Violation {
            path: path.to_path_buf(),
            line: idx + 1,
            rule: "Sleep in production code",
            text: line.as_ref().trim().to_string(),
        })
        .collect()
}

/// Run `check` over every production file of the workspace
///
/// # Panics
///
/// Panics if a production directory is missing, so a moved crate cannot make
/// the scan silently pass.
#[must_use]
pub fn scan_production<F>(check: F) -> Vec<Violation>
where
    F: Fn(&Path, &[String]) -> Vec<Violation>,
{
    let root = workspace_root();
    let mut violations = Vec::new();
    for dir in PRODUCTION_DIRS {
        let dir = root.join(dir);
        assert!(dir.is_dir(), "production directory missing: {}", dir.display());
        for file in rust_files(&dir) {
            let lines = read_lines(&file);
            violations.extend(check(&file, &lines));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_async_fn_detected() {
        let code = [
            "pub async fn load(&self) {",
            "    let contents = std::fs::read_to_string(\"file.txt\")?;",
            "}",
        ];
        assert_eq!(fn_context(&code, 1), FnContext::Async);
        assert_eq!(blocking_io_in_async(Path::new("x.rs"), &code).len(), 1);
    }

    #[test]
    fn test_sync_fn_allowed() {
        let code = [
            "pub(crate) fn load_config() {",
            "    let contents = std::fs::read_to_string(\"gallery.toml\")?;",
            "}",
        ];
        assert_eq!(fn_context(&code, 1), FnContext::Sync);
        assert!(blocking_io_in_async(Path::new("x.rs"), &code).is_empty());
    }

    #[test]
    fn test_test_code_skipped() {
        let code = [
            "#[tokio::test]",
            "async fn test_something() {",
            "    tokio::time::sleep(Duration::from_millis(5)).await;",
            "}",
        ];
        assert_eq!(fn_context(&code, 2), FnContext::Test);
        assert!(sleeps_outside_tests(Path::new("x.rs"), &code).is_empty());

        let module = ["fn helper() {}", "#[cfg(test)]", "mod tests {", "    std::thread::sleep(d);"];
        assert_eq!(fn_context(&module, 3), FnContext::Test);
    }

    #[test]
    fn test_production_sleep_reported() {
        let code = [
            "async fn poll(&self) {",
            "    tokio::time::sleep(Duration::from_secs(1)).await; // wait",
            "}",
        ];
        let violations = sleeps_outside_tests(Path::new("poll.rs"), &code);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
    }

    #[test]
    fn test_comments_ignored() {
        assert_eq!(code_part("let x = 1; // std::fs::read"), "let x = 1; ");
    }
}
