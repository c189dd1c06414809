// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live stream and durable log specs.

use crate::prelude::*;

#[tokio::test]
async fn every_subscriber_sees_the_same_sequence() {
    let project = Project::new();
    project.script(
        "chatty.sh",
        "for i in $(seq 1 20); do echo \"line $i\"; done\necho 'PROGRESS 100 Flushed'\n",
    );

    let id = project.start("chatty.sh");
    let rx1 = project.registry().attach(&id).unwrap();
    let rx2 = project.registry().attach(&id).unwrap();

    let (seq1, seq2) = tokio::join!(drain(rx1), drain(rx2));
    assert_eq!(seq1, seq2);
    assert_eq!(lines(&seq1).len(), 21);
}

#[tokio::test]
async fn log_holds_exactly_what_was_streamed() {
    let project = Project::new();
    project.script(
        "mixed.sh",
        "echo out-1\necho err-1 >&2\necho 'PROGRESS 40 Mid'\necho out-2\n",
    );

    let id = project.start("mixed.sh");
    let events = drain(project.registry().attach(&id).unwrap()).await;

    let logged: String = project.log(&id);
    assert_eq!(lines(&events), logged.lines().collect::<Vec<_>>());
}

#[tokio::test]
async fn stderr_lines_are_interleaved_into_the_stream() {
    let project = Project::new();
    project.script("noisy.sh", "echo out\necho err >&2\n");

    let id = project.start("noisy.sh");
    let events = drain(project.registry().attach(&id).unwrap()).await;

    let mut seen = lines(&events);
    seen.sort_unstable();
    assert_eq!(seen, vec!["err", "out"]);
}

#[tokio::test]
async fn late_subscriber_gets_a_closed_stream_but_the_log_remains() {
    let project = Project::new();
    project.script("burst.sh", "echo alpha\necho beta\n");

    let id = project.start("burst.sh");
    project.wait_terminal(&id).await;

    let events = drain(project.registry().attach(&id).unwrap()).await;
    assert!(events.is_empty());

    let log = project.log(&id);
    assert_eq!(log, "alpha\nbeta\n");
}

#[tokio::test]
async fn attach_mid_run_misses_history_but_catches_the_finish() {
    let project = Project::new();
    // Handshake through the filesystem: the script emits one line, then
    // waits for the spec to observe it before finishing.
    let project_dir = project.registry().scripts().root().to_path_buf();
    let gate = project_dir.join("gate");
    project.script(
        "gated.sh",
        "echo early\nuntil [ -f gate ]; do sleep 0.05; done\necho late\n",
    );

    let id = project.start("gated.sh");
    project.wait_running(&id).await;

    // Give the first line time to be published before attaching.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let rx = project.registry().attach(&id).unwrap();
    std::fs::write(&gate, "go").unwrap();

    let events = drain(rx).await;
    let seen = lines(&events);
    assert!(!seen.contains(&"early"), "no backfill for live attach: {seen:?}");
    assert!(seen.contains(&"late"));
    assert!(matches!(events.last().unwrap(), JobEvent::Finished { .. }));

    // The durable log still has the full history.
    let log = project.log(&id);
    assert!(log.contains("early"));
    assert!(log.contains("late"));
}
