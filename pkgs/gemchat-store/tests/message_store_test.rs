// Tests for the windowed MessageStore

use chrono::{Duration, Utc};
use gemchat_store::{MessageContent, MessageStore, Sender};

fn text(s: &str) -> MessageContent {
    MessageContent::Text {
        text: s.to_string(),
    }
}

fn assert_window_invariant(store: &MessageStore) {
    let expected = store
        .len()
        .min(store.page_count() * store.page_size());
    assert_eq!(store.visible_window().len(), expected);
}

#[test]
fn test_initialize_yields_sorted_history() {
    for seed_count in [0, 1, 2, 19, 40, 101] {
        let mut store = MessageStore::new(20);
        store.initialize(seed_count, Utc::now());

        assert_eq!(store.len(), seed_count);
        assert!(store
            .history()
            .windows(2)
            .all(|pair| pair[0].id < pair[1].id && pair[0].created_at < pair[1].created_at));
    }
}

#[test]
fn test_initialize_resets_window() {
    let mut store = MessageStore::new(10);
    store.initialize(30, Utc::now());
    store.grow_window();
    assert_eq!(store.page_count(), 2);

    store.initialize(30, Utc::now());
    assert_eq!(store.page_count(), 1);
    assert_eq!(store.visible_window().len(), 10);
}

#[test]
fn test_window_invariant_across_operations() {
    let now = Utc::now();

    for seed_count in [0, 1, 19, 20, 21, 45] {
        let mut store = MessageStore::new(20);
        store.initialize(seed_count, now);
        assert_window_invariant(&store);

        for round in 0..4 {
            store.grow_window();
            assert_window_invariant(&store);

            store.append(Sender::User, text(&format!("ping {}", round)), now);
            assert_window_invariant(&store);
        }
    }
}

#[test]
fn test_window_is_newest_suffix() {
    let mut store = MessageStore::new(20);
    store.initialize(45, Utc::now());

    let window = store.visible_window();
    assert_eq!(window.len(), 20);
    assert_eq!(window.last(), store.history().last());
    assert_eq!(window[0].id, store.history()[25].id);
}

#[test]
fn test_grow_when_fully_visible_is_noop() {
    let mut store = MessageStore::new(20);
    store.initialize(15, Utc::now());

    assert!(!store.has_more());
    assert!(!store.grow_window());
    assert_eq!(store.page_count(), 1);

    let mut empty = MessageStore::new(20);
    assert!(!empty.grow_window());
    assert_eq!(empty.page_count(), 1);
}

#[test]
fn test_forty_messages_two_pages() {
    let mut store = MessageStore::new(20);
    store.initialize(40, Utc::now());
    assert_eq!(store.visible_window().len(), 20);
    assert!(store.has_more());

    assert!(store.grow_window());
    assert_eq!(store.visible_window().len(), 40);

    assert!(!store.grow_window());
    assert_eq!(store.page_count(), 2);
    assert_eq!(store.visible_window().len(), 40);
}

#[test]
fn test_partial_last_page() {
    let mut store = MessageStore::new(20);
    store.initialize(25, Utc::now());

    assert!(store.grow_window());
    assert_eq!(store.visible_window().len(), 25);
    assert!(!store.has_more());
}

#[test]
fn test_append_after_seed_is_newest() {
    let now = Utc::now();
    let mut store = MessageStore::new(20);
    store.initialize(40, now);

    let appended = store.append(Sender::User, text("hello"), now).clone();

    assert_eq!(store.len(), 41);
    assert_eq!(store.visible_window().len(), 20);
    assert_eq!(store.visible_window().last(), Some(&appended));
    assert!(appended.id > store.history()[39].id);
}

#[test]
fn test_append_ids_strictly_increase_under_clock_skew() {
    let now = Utc::now();
    let mut store = MessageStore::new(20);

    let times = [
        now,
        now,
        now - Duration::minutes(1),
        now + Duration::milliseconds(1),
    ];
    for (i, t) in times.into_iter().enumerate() {
        store.append(Sender::User, text(&i.to_string()), t);
    }

    assert!(store.history().windows(2).all(|p| p[0].id < p[1].id));
}
