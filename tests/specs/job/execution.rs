// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle and progress specs: Pending through terminal states.

use crate::prelude::*;

#[tokio::test]
async fn clean_exit_with_done_marker_succeeds() {
    let project = Project::new();
    project.script(
        "deploy.sh",
        "echo 'PROGRESS 10 Preparing'\n\
         echo 'PROGRESS 50 Deploying'\n\
         echo 'PROGRESS 100 Verifying'\n\
         echo 'DONE'\n",
    );

    let id = project.start("deploy.sh");
    let events = drain(project.registry().attach(&id).unwrap()).await;

    assert_eq!(
        progress(&events),
        vec![(10, "Preparing"), (50, "Deploying"), (100, "Verifying"), (100, "done")]
    );

    let snapshot = project.wait_terminal(&id).await;
    assert_eq!(snapshot.state, JobState::Succeeded);
    assert_eq!(snapshot.progress_percent, 100);
    assert_eq!(snapshot.exit_code, Some(0));
    assert!(snapshot.started_at_ms.is_some());
    assert!(snapshot.ended_at_ms.unwrap() >= snapshot.started_at_ms.unwrap());
}

#[tokio::test]
async fn clean_exit_without_done_still_reads_complete() {
    let project = Project::new();
    project.script("quiet.sh", "echo 'PROGRESS 30 Working'\n");

    let id = project.start("quiet.sh");
    let snapshot = project.wait_terminal(&id).await;

    assert_eq!(snapshot.state, JobState::Succeeded);
    assert_eq!(snapshot.progress_percent, 100);
    assert_eq!(snapshot.progress_message, "Working");
}

#[tokio::test]
async fn nonzero_exit_fails_and_freezes_progress() {
    let project = Project::new();
    project.script("broken.sh", "echo 'PROGRESS 60 Migrating'\nexit 2\n");

    let id = project.start("broken.sh");
    let snapshot = project.wait_terminal(&id).await;

    assert_eq!(snapshot.state, JobState::Failed);
    assert_eq!(snapshot.exit_code, Some(2));
    assert_eq!(snapshot.progress_percent, 60);
    assert_eq!(snapshot.progress_message, "Migrating");
}

#[tokio::test]
async fn progress_never_regresses_and_clamps_to_100() {
    let project = Project::new();
    project.script(
        "jitter.sh",
        "echo 'PROGRESS 80 Almost'\n\
         echo 'PROGRESS 30 Stale'\n\
         echo 'PROGRESS 250 Overflow'\n",
    );

    let id = project.start("jitter.sh");
    let events = drain(project.registry().attach(&id).unwrap()).await;

    assert_eq!(progress(&events), vec![(80, "Almost"), (80, "Stale"), (100, "Overflow")]);
}

#[tokio::test]
async fn protocol_lines_also_appear_verbatim_in_output() {
    let project = Project::new();
    project.script("mixed.sh", "echo before\necho 'PROGRESS 50 Half'\necho after\n");

    let id = project.start("mixed.sh");
    let events = drain(project.registry().attach(&id).unwrap()).await;

    assert_eq!(lines(&events), vec!["before", "PROGRESS 50 Half", "after"]);
}

#[tokio::test]
async fn repo_file_runs_from_its_repo_root() {
    let project = Project::new();
    project.repo_file("repo-0a1b2c3d", "data/marker.txt", "present\n");
    project.repo_file("repo-0a1b2c3d", "tools/check.sh", "cat data/marker.txt\n");

    let id = project
        .registry()
        .start(
            &SourceRef::RepoFile {
                repo_id: "repo-0a1b2c3d".to_string(),
                path: "tools/check.sh".to_string(),
            },
            Vec::new(),
        )
        .unwrap();

    let snapshot = project.wait_terminal(&id).await;
    assert_eq!(snapshot.state, JobState::Succeeded);
    assert_eq!(snapshot.source, "repo-0a1b2c3d:tools/check.sh");
    assert!(project.log(&id).contains("present"));
}

#[tokio::test]
async fn list_includes_every_started_job() {
    let project = Project::new();
    project.script("one.sh", "true\n");

    let a = project.start("one.sh");
    let b = project.start("one.sh");
    project.wait_terminal(&a).await;
    project.wait_terminal(&b).await;

    let ids: Vec<JobId> = project.registry().list().into_iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a));
    assert!(ids.contains(&b));
}
