// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end CLI runs over temp diagram files.

#![allow(missing_docs)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const UNIVERSITY_TEXT: &str = "\
# university advising
entity Professor
entity Student
entity Course
relation Advises Professor one Student many
relation Teaches Professor one Course many
relation Takes Student many Course many
attribute Salary Professor multivalued
attribute GPA Student
target Advises
important GPA Teaches
";

const SMOKES_JSON: &str = r#"{
    "shapes": [
        {"type": "Entity", "details": {"id": 1, "name": "Person"}},
        {"type": "Attribute", "details": {"id": 2, "name": "Smokes"}},
        {"type": "Relationship", "details": {"id": 3, "name": "Friends", "slots": [
            {"entityId": 1, "cardinality": "many"},
            {"entityId": 1, "cardinality": "many"}
        ]}}
    ],
    "connectors": [
        {"type": "Connector", "source": 2, "destination": 1}
    ],
    "target": "Smokes",
    "important": ["Friends"]
}"#;

fn walker() -> Command {
    Command::cargo_bin("walker").expect("walker binary should build")
}

fn write_diagram(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("diagram file should be writable");
    path
}

#[test]
fn walk_emits_target_and_background_sections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let diagram = write_diagram(&dir, "university.walker", UNIVERSITY_TEXT);

    walker()
        .arg("--walk")
        .arg(&diagram)
        .assert()
        .success()
        .stdout(predicate::str::contains("//target"))
        .stdout(predicate::str::contains(
            "mode: advises(+professorid,+studentid).",
        ))
        .stdout(predicate::str::contains("//background"))
        .stdout(predicate::str::contains("mode: gpa(+studentid)."));
}

#[test]
fn shortest_walk_frees_unreached_variables() {
    let dir = tempfile::tempdir().expect("tempdir");
    let diagram = write_diagram(&dir, "university.walker", UNIVERSITY_TEXT);

    walker()
        .arg("--shortest")
        .arg(&diagram)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "mode: teaches(+professorid,-courseid).",
        ))
        // Salary is never walked: fully bound, with its multivalued slot.
        .stdout(predicate::str::contains(
            "mode: salary(+professorid,#salary).",
        ));
}

#[test]
fn json_diagram_with_reflexive_relation_emits_both_directions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let diagram = write_diagram(&dir, "smokes.json", SMOKES_JSON);

    walker()
        .arg(&diagram)
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: smokes(+personid)."))
        .stdout(predicate::str::contains(
            "mode: friends(+personid,-personid).",
        ))
        .stdout(predicate::str::contains(
            "mode: friends(-personid,+personid).",
        ));
}

#[test]
fn strategy_flags_are_mutually_exclusive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let diagram = write_diagram(&dir, "university.walker", UNIVERSITY_TEXT);

    walker()
        .arg("--walk")
        .arg("--shortest")
        .arg(&diagram)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn output_flag_writes_the_mode_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let diagram = write_diagram(&dir, "university.walker", UNIVERSITY_TEXT);
    let out = dir.path().join("modes.txt");

    walker()
        .arg("--no-walk")
        .arg("--output")
        .arg(&out)
        .arg(&diagram)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out).expect("mode file should exist");
    assert!(written.starts_with("//target\n"));
    assert!(written.contains("mode: advises(+professorid,+studentid)."));
}

#[test]
fn depth_zero_random_walk_falls_back_to_fully_bound() {
    let dir = tempfile::tempdir().expect("tempdir");
    let diagram = write_diagram(&dir, "university.walker", UNIVERSITY_TEXT);

    walker()
        .arg("--random-walk")
        .arg("--depth")
        .arg("0")
        .arg(&diagram)
        .assert()
        .success()
        // A zero-step walk is just the target node, so every feature falls
        // through to the unexplored pass.
        .stdout(predicate::str::contains("mode: gpa(+studentid)."))
        .stdout(predicate::str::contains(
            "mode: teaches(+professorid,+courseid).",
        ));
}

#[test]
fn missing_diagram_file_fails_before_any_output() {
    walker()
        .arg("no-such-diagram.walker")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to read"));
}
