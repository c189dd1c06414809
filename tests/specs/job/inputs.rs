// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stdin answer specs: pre-supplied lines, then EOF.

use crate::prelude::*;

#[tokio::test]
async fn answers_arrive_in_order() {
    let project = Project::new();
    project.script(
        "wizard.sh",
        "read name\nread env\necho \"deploying $name to $env\"\n",
    );

    let id = project.start_with_inputs("wizard.sh", &["api", "staging"]);
    let snapshot = project.wait_terminal(&id).await;

    assert_eq!(snapshot.state, JobState::Succeeded);
    assert!(project.log(&id).contains("deploying api to staging"));
}

#[tokio::test]
async fn missing_answers_surface_as_eof_not_a_hang() {
    let project = Project::new();
    project.script(
        "wizard.sh",
        "read first\n\
         if read second; then echo \"second=$second\"; else echo 'no second answer'; fi\n",
    );

    let id = project.start_with_inputs("wizard.sh", &["only-one"]);
    let snapshot = project.wait_terminal(&id).await;

    assert_eq!(snapshot.state, JobState::Succeeded);
    assert!(project.log(&id).contains("no second answer"));
}

#[tokio::test]
async fn surplus_answers_are_simply_unread() {
    let project = Project::new();
    project.script("single.sh", "read only\necho \"got $only\"\n");

    let id = project.start_with_inputs("single.sh", &["first", "second", "third"]);
    let snapshot = project.wait_terminal(&id).await;

    assert_eq!(snapshot.state, JobState::Succeeded);
    let log = project.log(&id);
    assert!(log.contains("got first"));
    assert!(!log.contains("second"));
}

#[tokio::test]
async fn job_with_no_reads_ignores_closed_stdin() {
    let project = Project::new();
    project.script("silent.sh", "echo 'PROGRESS 100 Skipped input'\n");

    let id = project.start_with_inputs("silent.sh", &[]);
    let snapshot = project.wait_terminal(&id).await;

    assert_eq!(snapshot.state, JobState::Succeeded);
}
