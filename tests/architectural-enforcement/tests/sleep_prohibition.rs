//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep. Ordering between in-flight
//! requests is handled by generation stamping and locks, never by waiting a
//! while and hoping.

use architectural_enforcement::{scan_production, sleeps_outside_tests};

#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan_production(sleeps_outside_tests::<String>);

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep as poor man's synchronization");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}
