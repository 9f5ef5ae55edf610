// Tests for ChatSession paging and the send/reply cycle

use async_trait::async_trait;
use gemchat_store::{
    ChatConfig, ChatError, ChatEvent, ChatSession, ImageAttachment, LoadOutcome, Message,
    MessageContent, ReplySimulator, Sender,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

async fn wait_for_reply(events: &mut UnboundedReceiver<ChatEvent>) -> Message {
    while let Some(event) = events.recv().await {
        if let ChatEvent::ReplyReceived(message) = event {
            return message;
        }
    }
    panic!("event channel closed before reply");
}

async fn seeded_session() -> (ChatSession, UnboundedReceiver<ChatEvent>) {
    let (session, events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());
    session.load_history().await;
    (session, events)
}

#[tokio::test(start_paused = true)]
async fn test_load_history_shows_first_page() {
    let (session, mut events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());
    assert!(session.snapshot().messages.is_empty());

    session.load_history().await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.total, 40);
    assert_eq!(snapshot.messages.len(), 20);
    assert!(snapshot.has_more);
    assert!(!snapshot.initial_loading);
    assert_eq!(
        events.recv().await,
        Some(ChatEvent::HistoryLoaded {
            total: 40,
            visible: 20
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_load_more_until_exhausted() {
    let (session, _events) = seeded_session().await;

    assert_eq!(
        session.load_more().await,
        LoadOutcome::Loaded {
            page_count: 2,
            visible: 40
        }
    );
    assert_eq!(session.load_more().await, LoadOutcome::NothingMore);
    assert_eq!(session.page_count(), 2);
    assert_eq!(session.visible_window().len(), 40);
}

#[tokio::test(start_paused = true)]
async fn test_load_more_on_empty_history_is_noop() {
    let (session, _events) = ChatSession::with_simulated_replies("empty", ChatConfig::default());

    assert_eq!(session.load_more().await, LoadOutcome::NothingMore);
    assert!(!session.is_loading_older());
    assert_eq!(session.page_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_load_more_is_single_flight() {
    let config = ChatConfig {
        seed_count: 100,
        ..Default::default()
    };
    let (session, _events) = ChatSession::with_simulated_replies("room-1", config);
    session.load_history().await;

    let (first, second) = tokio::join!(session.load_more(), session.load_more());

    assert_eq!(
        first,
        LoadOutcome::Loaded {
            page_count: 2,
            visible: 40
        }
    );
    assert_eq!(second, LoadOutcome::AlreadyLoading);
    assert_eq!(session.page_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_load_more_completes_after_caller_gives_up() {
    let (session, _events) = seeded_session().await;

    let abandoned =
        tokio::time::timeout(Duration::from_millis(100), session.load_more()).await;
    assert!(abandoned.is_err());
    assert!(session.is_loading_older());

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(!session.is_loading_older());
    assert_eq!(session.page_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_empty_send_is_rejected() {
    let (session, mut events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());

    assert!(matches!(session.send(Some(""), None), Err(ChatError::EmptyMessage)));
    assert!(matches!(session.send(Some("   \n"), None), Err(ChatError::EmptyMessage)));
    assert!(matches!(session.send(None, None), Err(ChatError::EmptyMessage)));

    assert!(session.history().is_empty());
    assert!(!session.is_reply_pending());
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_send_then_reply() {
    let (session, mut events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());

    let sent = session.send(Some("  hi "), None).unwrap();
    assert_eq!(sent.sender, Sender::User);
    assert_eq!(sent.content.text(), Some("hi"));
    assert_eq!(session.history().len(), 1);
    assert!(session.is_reply_pending());

    let reply = wait_for_reply(&mut events).await;

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1], reply);
    assert_eq!(reply.sender, Sender::Agent);
    assert!(reply.id > sent.id);
    assert_eq!(reply.content.text(), Some("Gemini: You said \"hi\""));
    assert!(!session.is_reply_pending());
}

#[tokio::test(start_paused = true)]
async fn test_send_rejected_while_reply_pending() {
    let (session, mut events) = seeded_session().await;

    session.send(Some("first"), None).unwrap();
    assert!(matches!(
        session.send(Some("second"), None),
        Err(ChatError::ReplyPending)
    ));
    assert_eq!(session.history().len(), 41);

    wait_for_reply(&mut events).await;
    session.send(Some("second"), None).unwrap();
    assert_eq!(session.history().len(), 43);
}

#[tokio::test(start_paused = true)]
async fn test_image_send_gets_image_reply() {
    let (session, mut events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());
    let image = ImageAttachment::from_bytes("image/png", &[0x89, 0x50, 0x4e, 0x47]).unwrap();

    let sent = session.send(None, Some(image)).unwrap();
    assert!(matches!(sent.content, MessageContent::Image { .. }));
    assert!(sent.clipboard_text().starts_with("data:image/png;base64,"));

    let reply = wait_for_reply(&mut events).await;
    assert_eq!(reply.content.text(), Some("Gemini: Nice image!"));
}

#[tokio::test(start_paused = true)]
async fn test_events_follow_send_order() {
    let (session, mut events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());

    let sent = session.send(Some("hello"), None).unwrap();

    assert_eq!(events.recv().await, Some(ChatEvent::MessageAppended(sent)));
    assert_eq!(events.recv().await, Some(ChatEvent::ReplyStarted));
    assert!(matches!(
        events.recv().await,
        Some(ChatEvent::ReplyReceived(_))
    ));
}

struct CountingReplier {
    calls: AtomicUsize,
}

#[async_trait]
impl ReplySimulator for CountingReplier {
    async fn reply(&self, input: &Message) -> MessageContent {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        MessageContent::Text {
            text: format!("reply {} to {}", n, input.id),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_exactly_one_reply_per_send() {
    let replier = Arc::new(CountingReplier {
        calls: AtomicUsize::new(0),
    });
    let (session, mut events) = ChatSession::open("room-1", ChatConfig::default(), replier.clone());

    for i in 0..3 {
        session.send(Some(format!("msg {}", i).as_str()), None).unwrap();
        wait_for_reply(&mut events).await;
    }

    let history = session.history();
    assert_eq!(replier.calls.load(Ordering::SeqCst), 3);
    assert_eq!(history.len(), 6);
    assert!(history
        .iter()
        .enumerate()
        .all(|(i, m)| m.sender == if i % 2 == 0 { Sender::User } else { Sender::Agent }));
    assert!(history.windows(2).all(|p| p[0].id < p[1].id));
}

async fn wait_until_history_loading(session: &ChatSession) {
    while !session.snapshot().initial_loading {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_send_rejected_while_history_loading() {
    let (session, _events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());

    let loading = tokio::spawn({
        let session = session.clone();
        async move { session.load_history().await }
    });
    wait_until_history_loading(&session).await;

    assert!(matches!(
        session.send(Some("hi"), None),
        Err(ChatError::HistoryLoading)
    ));
    assert!(!session.is_reply_pending());

    assert!(loading.await.unwrap());
    tokio::time::sleep(Duration::from_secs(5)).await;

    let history = session.history();
    assert_eq!(history.len(), 40);
    assert!(history
        .iter()
        .all(|m| m.content.text().is_some_and(|t| t.starts_with("Old "))));
}

#[tokio::test(start_paused = true)]
async fn test_history_load_is_single_flight() {
    let (session, mut events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.load_history().await }
    });
    wait_until_history_loading(&session).await;

    assert!(!session.load_history().await);
    assert_eq!(session.load_more().await, LoadOutcome::AlreadyLoading);
    assert!(first.await.unwrap());

    assert_eq!(session.history().len(), 40);
    assert!(matches!(
        events.recv().await,
        Some(ChatEvent::HistoryLoaded { .. })
    ));
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_reload_supersedes_pending_page_load() {
    let config = ChatConfig {
        load_delay: Duration::from_secs(3),
        ..Default::default()
    };
    let (session, _events) = ChatSession::with_simulated_replies("room-1", config);
    session.load_history().await;

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.load_more().await }
    });
    while !session.is_loading_older() {
        tokio::task::yield_now().await;
    }

    assert!(session.load_history().await);
    assert_eq!(session.page_count(), 1);
    assert!(!session.is_loading_older());

    assert_eq!(pending.await.unwrap(), LoadOutcome::Superseded);
    assert_eq!(session.page_count(), 1);
    assert_eq!(session.visible_window().len(), 20);

    assert_eq!(
        session.load_more().await,
        LoadOutcome::Loaded {
            page_count: 2,
            visible: 40
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_reload_drops_pending_reply() {
    let config = ChatConfig {
        reply_delay: Duration::from_secs(5),
        ..Default::default()
    };
    let (session, _events) = ChatSession::with_simulated_replies("room-1", config);
    session.load_history().await;

    session.send(Some("hi"), None).unwrap();
    assert!(session.load_history().await);
    assert!(!session.is_reply_pending());

    tokio::time::sleep(Duration::from_secs(10)).await;

    let history = session.history();
    assert_eq!(history.len(), 40);
    assert!(history.iter().all(|m| m.content.text() != Some("Gemini: You said \"hi\"")));
    assert!(session.send(Some("again"), None).is_ok());
}

struct PanickingReplier;

#[async_trait]
impl ReplySimulator for PanickingReplier {
    async fn reply(&self, _input: &Message) -> MessageContent {
        panic!("backend unavailable");
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_reply_releases_send() {
    let (session, _events) = ChatSession::open("room-1", ChatConfig::default(), Arc::new(PanickingReplier));

    session.send(Some("first"), None).unwrap();
    while session.is_reply_pending() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(session.history().len(), 1);
    assert!(session.send(Some("second"), None).is_ok());
}

#[test]
fn test_send_outside_runtime_is_rejected() {
    let (session, _events) = ChatSession::with_simulated_replies("room-1", ChatConfig::default());

    assert!(matches!(
        session.send(Some("hi"), None),
        Err(ChatError::NoRuntime)
    ));
    assert!(session.history().is_empty());
    assert!(!session.is_reply_pending());
}
