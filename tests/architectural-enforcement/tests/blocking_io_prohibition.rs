//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async functions in the gallery crates MUST NOT block the
//! runtime. Use `tokio::fs` and `reqwest` async APIs.
//!
//! Blocking I/O is acceptable in plain functions (configuration loading
//! before any request is issued) and in test code.

use architectural_enforcement::{blocking_io_in_async, scan_production};

#[test]
fn test_no_blocking_io_in_async_code() {
    let violations = scan_production(blocking_io_in_async::<String>);

    if !violations.is_empty() {
        eprintln!("\n❌ Blocking I/O calls found inside async functions!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::fs::read_to_string().await, tokio::fs::rename().await");
        eprintln!("  - reqwest::Client (async)");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.",
            violations.len()
        );
    }
}
