use std::fs;

use stubmap::canonicalize_or_current;
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_handles_existing_and_missing_paths() {
    let tmp = tempdir().expect("tempdir");
    let listing = tmp.path().join("functions.json");
    fs::write(&listing, "[]").expect("write listing");

    let existing = canonicalize_or_current(&listing.to_string_lossy()).expect("existing");
    assert_eq!(existing, listing.canonicalize().expect("canon listing"));

    let missing = canonicalize_or_current("does-not-exist.json").expect("missing");
    assert!(missing.is_absolute());
    assert!(missing.ends_with("does-not-exist.json"));
}

#[test]
fn init_logging_tolerates_repeated_calls() {
    stubmap::init_logging(false);
    stubmap::init_logging(true);
}
