//! Personal log dictation through the dispatcher.

use nova::error::InputError;
use nova::handlers::REWRITE_INSTRUCTION;
use nova::{Action, UserId};

use crate::helpers::{Harness, Setup};

async fn start_log(harness: &Harness, user: &UserId) {
    harness
        .dispatcher()
        .dispatch(user, Action::new("start personal log"))
        .await;
}

fn saved_logs(harness: &Harness) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(harness.log_dir.path().join("logs")) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn dictation_is_rewritten_saved_and_remembered() {
    let mut harness = Harness::new(Setup::default());
    let user = UserId::new("picard");
    harness.input.push(Ok("We reached the Neutral Zone".to_owned()));

    start_log(&harness, &user).await;

    let rewrite = harness.llm.requests().pop().unwrap();
    assert_eq!(rewrite.system, REWRITE_INSTRUCTION);
    assert_eq!(rewrite.user, "We reached the Neutral Zone");
    assert_eq!(rewrite.max_tokens, Some(150));

    let logs = saved_logs(&harness);
    assert_eq!(logs.len(), 1);
    let file_name = logs[0].file_name().unwrap().to_str().unwrap().to_owned();
    assert!(file_name.starts_with("personal_log_") && file_name.ends_with(".txt"));
    assert_eq!(
        std::fs::read_to_string(&logs[0]).unwrap(),
        "Captain's log: We reached the Neutral Zone"
    );

    let context = harness.context.get(&user);
    assert_eq!(
        context["last_log"],
        "Captain's log: We reached the Neutral Zone"
    );

    assert_eq!(
        harness.spoken().await,
        vec![
            "Please dictate your personal log.".to_owned(),
            format!("Personal log saved as {file_name}"),
            "Personal log entry created.".to_owned(),
        ]
    );
}

#[tokio::test]
async fn failed_dictation_discards_the_entry() {
    let mut harness = Harness::new(Setup::default());
    harness.input.push(Err(InputError::NoSpeech));

    start_log(&harness, &UserId::default()).await;

    assert!(harness.llm.requests().is_empty());
    assert!(saved_logs(&harness).is_empty());
    assert!(harness.context.get(&UserId::default()).is_empty());
    assert_eq!(
        harness.spoken().await,
        vec![
            "Please dictate your personal log.",
            "Could not start personal log"
        ]
    );
}

#[tokio::test]
async fn failed_rewrite_discards_the_entry() {
    let mut harness = Harness::new(Setup::default());
    harness.llm.fail_rewrites();
    harness.input.push(Ok("Shields at forty percent".to_owned()));

    start_log(&harness, &UserId::default()).await;

    assert!(saved_logs(&harness).is_empty());
    assert!(harness.context.get(&UserId::default()).is_empty());
    assert_eq!(
        harness.spoken().await.last().unwrap(),
        "Could not start personal log"
    );
}

#[tokio::test]
async fn unwritable_log_directory_leaves_context_untouched() {
    let mut harness = Harness::new(Setup::default());
    std::fs::write(harness.log_dir.path().join("logs"), "not a directory").unwrap();
    harness.input.push(Ok("Away team returned".to_owned()));

    start_log(&harness, &UserId::default()).await;

    assert!(harness.context.get(&UserId::default()).is_empty());
    assert_eq!(
        harness.spoken().await.last().unwrap(),
        "Could not start personal log"
    );
}
