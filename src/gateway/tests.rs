use super::*;
use crate::testing::*;
use concierge_core::{
    context::{Role, Turn},
    message::IncomingMessage,
    schedule::ScheduleSnapshot,
};
use concierge_memory::JsonFileStore;

const SENDER: &str = "whatsapp:+27821234567";

async fn history_len(h: &Harness, sender: &str) -> usize {
    h.store.get(sender).await.unwrap().len()
}

#[test]
fn test_is_reset_trims_and_ignores_case() {
    assert!(is_reset("reset", "reset"));
    assert!(is_reset("  RESET \n", "reset"));
    assert!(is_reset("Reset", " reset "));
    assert!(!is_reset("reset please", "reset"));
    assert!(!is_reset("", "reset"));
}

#[tokio::test]
async fn test_plain_reply_appends_two_turns() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["We have Monday 09:00 open."]));

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "Any slots Monday?"))
        .await;

    assert_eq!(reply.outcome, Outcome::Plain);
    assert_eq!(reply.text, "We have Monday 09:00 open.");
    let history = h.store.get(SENDER).await.unwrap();
    assert_eq!(
        history,
        vec![
            Turn::user("Any slots Monday?"),
            Turn::assistant("We have Monday 09:00 open."),
        ]
    );
}

#[tokio::test]
async fn test_prompt_carries_live_availability() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["Sure."]));

    h.gateway
        .handle_message(&IncomingMessage::new(SENDER, "hi"))
        .await;

    let ctx = h.provider.last_context();
    assert!(ctx
        .system_prompt
        .ends_with("--- LIVE AVAILABILITY ---\n• *Monday*: 09:00, 10:30\n-------------------------"));
    assert!(ctx.system_prompt.contains("ACTION_ESCALATE"));
}

#[tokio::test]
async fn test_unreadable_schedule_still_answers() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::build(
        FakeProvider::replying(&["Let me check with the team."]),
        Arc::new(JsonFileStore::new(tmp.path().join("memory.json"))),
        FakeSchedule(ScheduleSnapshot::Unavailable),
        RecordingAlert::default(),
        RecordingLeads::default(),
    );

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "hi"))
        .await;

    assert_eq!(reply.outcome, Outcome::Plain);
    assert!(h
        .provider
        .last_context()
        .system_prompt
        .contains("Error loading schedule."));
}

#[tokio::test]
async fn test_prior_turns_sent_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["First.", "Second."]));

    h.gateway
        .handle_message(&IncomingMessage::new(SENDER, "one"))
        .await;
    h.gateway
        .handle_message(&IncomingMessage::new(SENDER, "two"))
        .await;

    let ctx = h.provider.last_context();
    let roles: Vec<Role> = ctx.history.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    assert_eq!(ctx.history[0].content, "one");
    assert_eq!(ctx.history[2].content, "two");
    assert_eq!(history_len(&h, SENDER).await, 4);
}

#[tokio::test]
async fn test_senders_are_isolated() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["a", "b"]));

    h.gateway
        .handle_message(&IncomingMessage::new("+1555", "hello"))
        .await;
    h.gateway
        .handle_message(&IncomingMessage::new("+1666", "hello"))
        .await;

    assert_eq!(h.provider.last_context().history.len(), 1);
    assert_eq!(history_len(&h, "+1555").await, 2);
    assert_eq!(history_len(&h, "+1666").await, 2);
}

#[tokio::test]
async fn test_reset_clears_without_calling_provider() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["Hi!"]));
    h.gateway
        .handle_message(&IncomingMessage::new("+1555", "hello"))
        .await;
    assert_eq!(h.provider.calls(), 1);

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new("+1555", "  Reset "))
        .await;

    assert_eq!(reply.outcome, Outcome::Reset);
    assert_eq!(reply.text, "Memory cleared!");
    assert_eq!(h.provider.calls(), 1);
    assert_eq!(history_len(&h, "+1555").await, 0);

    let raw = std::fs::read_to_string(tmp.path().join("memory.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json, serde_json::json!({ "+1555": [] }));
}

#[tokio::test]
async fn test_reset_word_inside_sentence_is_normal_message() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["Done."]));

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "please reset my booking"))
        .await;

    assert_eq!(reply.outcome, Outcome::Plain);
    assert_eq!(h.provider.calls(), 1);
}

#[tokio::test]
async fn test_escalation_alerts_with_raw_message() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(
        tmp.path(),
        FakeProvider::replying(&["That sounds serious. ACTION_ESCALATE"]),
    );

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "my tooth is bleeding"))
        .await;

    assert_eq!(reply.outcome, Outcome::Escalated);
    assert_eq!(
        reply.text,
        "I've alerted the team directly. Someone will contact you shortly."
    );
    let sent = h.alerts.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![("my tooth is bleeding".to_string(), SENDER.to_string())]
    );

    let history = h.store.get(SENDER).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, reply.text);
}

#[tokio::test]
async fn test_failed_alert_still_gives_escalation_reply() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::build(
        FakeProvider::replying(&["ACTION_ESCALATE"]),
        Arc::new(JsonFileStore::new(tmp.path().join("memory.json"))),
        FakeSchedule::monday(),
        RecordingAlert {
            fail: true,
            ..Default::default()
        },
        RecordingLeads::default(),
    );

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "I need a human"))
        .await;

    assert_eq!(reply.outcome, Outcome::Escalated);
    assert_eq!(h.alerts.sent.lock().unwrap().len(), 1);
    assert_eq!(history_len(&h, SENDER).await, 2);
}

#[tokio::test]
async fn test_missed_lead_logged_and_marker_stripped() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(
        tmp.path(),
        FakeProvider::replying(&["Sorry, nothing left this week.\nACTION_LOG_MISSED"]),
    );

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "Saturday?"))
        .await;

    assert_eq!(reply.outcome, Outcome::LoggedMissed);
    assert_eq!(reply.text, "Sorry, nothing left this week.");
    assert_eq!(*h.leads.logged.lock().unwrap(), vec![SENDER.to_string()]);
    assert!(h.alerts.sent.lock().unwrap().is_empty());

    let history = h.store.get(SENDER).await.unwrap();
    assert_eq!(history[1].content, "Sorry, nothing left this week.");
}

#[tokio::test]
async fn test_missed_lead_log_failure_keeps_reply() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::build(
        FakeProvider::replying(&["Fully booked. ACTION_LOG_MISSED"]),
        Arc::new(JsonFileStore::new(tmp.path().join("memory.json"))),
        FakeSchedule(ScheduleSnapshot::NoSlots),
        RecordingAlert::default(),
        RecordingLeads {
            fail: true,
            ..Default::default()
        },
    );

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "any time?"))
        .await;

    assert_eq!(reply.text, "Fully booked.");
    assert_eq!(reply.outcome, Outcome::LoggedMissed);
}

#[tokio::test]
async fn test_booking_reply_is_prefix() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(
        tmp.path(),
        FakeProvider::replying(&["See you Monday at 10:30!\nACTION_BOOK: Monday|10:30"]),
    );

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "10:30 works"))
        .await;

    assert_eq!(reply.text, "See you Monday at 10:30!");
    assert_eq!(
        reply.outcome,
        Outcome::Booked {
            day: "Monday".into(),
            time: "10:30".into()
        }
    );
    assert!(h.leads.logged.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_failure_persists_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::failing("503 upstream"));

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "hello"))
        .await;

    assert_eq!(reply.outcome, Outcome::Unavailable);
    assert_eq!(
        reply.text,
        "Sorry, our system is currently updating. Please try again in a moment."
    );
    assert_eq!(history_len(&h, SENDER).await, 0);
    assert!(!tmp.path().join("memory.json").exists());
}

#[tokio::test]
async fn test_provider_timeout_is_unavailable() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = FakeProvider::replying(&["too late"]).with_delay(Duration::from_secs(5));
    let h = Harness::new(tmp.path(), provider);

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "hello"))
        .await;

    assert_eq!(reply.outcome, Outcome::Unavailable);
    assert_eq!(history_len(&h, SENDER).await, 0);
}

#[tokio::test]
async fn test_store_failure_still_replies() {
    let h = Harness::build(
        FakeProvider::replying(&["Hello there."]),
        Arc::new(FailingStore),
        FakeSchedule::monday(),
        RecordingAlert::default(),
        RecordingLeads::default(),
    );

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "hi"))
        .await;

    assert_eq!(reply.outcome, Outcome::Plain);
    assert_eq!(reply.text, "Hello there.");
    assert_eq!(h.provider.last_context().history, vec![Turn::user("hi")]);
}

#[tokio::test]
async fn test_user_text_with_tags_is_stored_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["Okay."]));
    let text = "My code is ACTION_42 and I saw [System] on the form";

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, text))
        .await;

    assert_eq!(reply.outcome, Outcome::Plain);
    assert_eq!(h.provider.last_context().history, vec![Turn::user(text)]);
    let history = h.store.get(SENDER).await.unwrap();
    assert_eq!(history[0].content, text);
}

#[tokio::test]
async fn test_corrupt_history_file_starts_fresh() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("memory.json"), "{not json at all").unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["Welcome!"]));

    let reply = h
        .gateway
        .handle_message(&IncomingMessage::new(SENDER, "hello"))
        .await;

    assert_eq!(reply.outcome, Outcome::Plain);
    assert_eq!(h.provider.last_context().history, vec![Turn::user("hello")]);
    assert_eq!(
        h.store.get(SENDER).await.unwrap(),
        vec![Turn::user("hello"), Turn::assistant("Welcome!")]
    );
}

#[tokio::test]
async fn test_sender_locks_released_after_each_request() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["Hi!"]));

    for i in 0..100 {
        h.gateway
            .handle_message(&IncomingMessage::new(format!("+1555{i:04}"), "reset"))
            .await;
    }
    h.gateway
        .handle_message(&IncomingMessage::new(SENDER, "hello"))
        .await;

    assert_eq!(h.gateway.tracked_senders().await, 0);
}

#[tokio::test]
async fn test_concurrent_messages_from_one_sender_keep_all_turns() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), FakeProvider::replying(&["a", "b", "c", "d"]));

    let mut handles = Vec::new();
    for i in 0..4 {
        let gateway = h.gateway.clone();
        handles.push(tokio::spawn(async move {
            gateway
                .handle_message(&IncomingMessage::new(SENDER, format!("msg {i}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(h.gateway.tracked_senders().await, 0);
    let history = h.store.get(SENDER).await.unwrap();
    assert_eq!(history.len(), 8);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
}
