use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use stubmap::commands::{available_formats, list_formats_command};

#[test]
fn available_formats_are_sorted_and_described() {
    let formats = available_formats();
    let names: Vec<&str> = formats.iter().map(|f| f.name.as_str()).collect();
    assert!(names.contains(&"csv"));
    assert!(names.contains(&"json"));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(formats.iter().all(|f| !f.description.is_empty() && !f.extensions.is_empty()));
}

#[test]
fn list_formats_command_succeeds() {
    list_formats_command(false).unwrap();
    list_formats_command(true).unwrap();
}

#[test]
fn formats_cli_lists_loaders() {
    cargo_bin_cmd!("stubmap")
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("json"))
        .stdout(predicate::str::contains("csv"));

    let output = cargo_bin_cmd!("stubmap")
        .args(["formats", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("formats json");
    assert!(body.as_array().is_some_and(|a| a.iter().any(|f| f["name"] == "json")));
}
