//! Chat session - drives one conversation's message store from async UI calls
//!
//! The session owns a [`MessageStore`] and layers the timed behavior on top of
//! it: the initial history load, loading older pages on scroll-to-top, and the
//! user-send / agent-reply cycle. Two flags keep the invariants regardless of
//! caller discipline:
//!
//! - `loading_older` makes [`ChatSession::load_more`] single-flight
//! - `reply_pending` rejects new sends until the previous reply has landed
//! - `initial_loading` makes [`ChatSession::load_history`] single-flight and
//!   rejects sends and page loads while the seed is pending
//!
//! Every reseed bumps a generation counter. A page load or reply scheduled
//! against an older generation is dropped instead of applied to the new
//! history.
//!
//! Delayed steps run on spawned tasks, so a started load or reply always
//! completes even if the caller stops waiting for it.

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::ChatError;
use crate::events::{ChatEvent, Message, MessageContent, Sender};
use crate::image::ImageAttachment;
use crate::message_store::MessageStore;
use crate::reply::{ReplySimulator, SimulatedReply};
use crate::ChatConfig;

/// Result of a [`ChatSession::load_more`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The window grew by one page
    Loaded { page_count: usize, visible: usize },
    /// Another load is still in flight
    AlreadyLoading,
    /// History is empty or already fully visible
    NothingMore,
    /// History was reloaded before the page landed; nothing was applied
    Superseded,
}

/// Everything a renderer needs to draw the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub messages: Vec<Message>,
    pub total: usize,
    pub has_more: bool,
    pub initial_loading: bool,
    pub loading_older: bool,
    pub reply_pending: bool,
}

#[derive(Debug)]
struct SessionState {
    store: MessageStore,
    initial_loading: bool,
    loading_older: bool,
    reply_pending: bool,
    generation: u64,
}

/// Handle to a live conversation. Clones share the same state.
#[derive(Clone)]
pub struct ChatSession {
    room_id: String,
    config: ChatConfig,
    state: Arc<Mutex<SessionState>>,
    replier: Arc<dyn ReplySimulator>,
    event_sender: mpsc::UnboundedSender<ChatEvent>,
}

impl ChatSession {
    /// Open an empty session with a custom reply backend
    pub fn open(
        room_id: impl Into<String>,
        config: ChatConfig,
        replier: Arc<dyn ReplySimulator>,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let room_id = room_id.into();

        info!("Opened chat session for room {}", room_id);

        let session = Self {
            room_id,
            state: Arc::new(Mutex::new(SessionState {
                store: MessageStore::new(config.page_size),
                initial_loading: false,
                loading_older: false,
                reply_pending: false,
                generation: 0,
            })),
            config,
            replier,
            event_sender,
        };

        (session, event_receiver)
    }

    /// Open an empty session answered by [`SimulatedReply`]
    pub fn with_simulated_replies(
        room_id: impl Into<String>,
        config: ChatConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let replier = Arc::new(SimulatedReply::new(config.reply_delay));
        Self::open(room_id, config, replier)
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Populate the demo history after the initial load delay.
    ///
    /// Replaces whatever history the session held and discards any page load
    /// or reply still pending against it. Returns `false` without doing
    /// anything when another load is already in flight.
    pub async fn load_history(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.initial_loading {
                debug!("History load already in flight for room {}", self.room_id);
                return false;
            }
            state.initial_loading = true;
        }

        tokio::time::sleep(self.config.initial_load_delay).await;

        let (total, visible) = {
            let mut state = self.state.lock();
            state.store.initialize(self.config.seed_count, Utc::now());
            state.generation += 1;
            state.initial_loading = false;
            state.loading_older = false;
            state.reply_pending = false;
            (state.store.len(), state.store.visible_window().len())
        };

        info!(
            "Loaded {} messages for room {} ({} visible)",
            total, self.room_id, visible
        );
        self.emit(ChatEvent::HistoryLoaded { total, visible });
        true
    }

    /// Grow the window by one page of older messages after the load delay.
    ///
    /// Single-flight: while one load (or the initial history load) is
    /// pending, further calls return [`LoadOutcome::AlreadyLoading`] without
    /// scheduling anything.
    pub async fn load_more(&self) -> LoadOutcome {
        let generation = {
            let mut state = self.state.lock();
            if state.loading_older || state.initial_loading {
                debug!("Load already in flight for room {}", self.room_id);
                return LoadOutcome::AlreadyLoading;
            }
            if !state.store.has_more() {
                return LoadOutcome::NothingMore;
            }
            state.loading_older = true;
            state.generation
        };
        self.emit(ChatEvent::OlderLoadStarted);

        let state = Arc::clone(&self.state);
        let events = self.event_sender.clone();
        let delay = self.config.load_delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let (page_count, visible) = {
                let mut state = state.lock();
                if state.generation != generation {
                    return LoadOutcome::Superseded;
                }
                state.store.grow_window();
                state.loading_older = false;
                (state.store.page_count(), state.store.visible_window().len())
            };

            let _ = events.send(ChatEvent::OlderLoaded {
                page_count,
                visible,
            });
            LoadOutcome::Loaded {
                page_count,
                visible,
            }
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Load task for room {} failed: {}", self.room_id, e);
                let mut state = self.state.lock();
                if state.generation == generation {
                    state.loading_older = false;
                }
                LoadOutcome::NothingMore
            }
        }
    }

    /// Append a user message and schedule the agent reply.
    ///
    /// Returns as soon as the user message is in the history. Fails without
    /// touching state when the input is empty, the initial history is still
    /// loading, a reply is still pending, or there is no Tokio runtime to run
    /// the reply on.
    pub fn send(&self, text: Option<&str>, image: Option<ImageAttachment>) -> Result<Message, ChatError> {
        let content = MessageContent::from_input(text, image)?;
        let runtime = Handle::try_current().map_err(|_| ChatError::NoRuntime)?;

        let (message, generation) = {
            let mut state = self.state.lock();
            if state.initial_loading {
                return Err(ChatError::HistoryLoading);
            }
            if state.reply_pending {
                return Err(ChatError::ReplyPending);
            }
            let message = state.store.append(Sender::User, content, Utc::now()).clone();
            state.reply_pending = true;
            (message, state.generation)
        };

        debug!("Appended user message {} to room {}", message.id, self.room_id);
        self.emit(ChatEvent::MessageAppended(message.clone()));
        self.request_reply(&runtime, message.clone(), generation);

        Ok(message)
    }

    fn request_reply(&self, runtime: &Handle, input: Message, generation: u64) {
        let state = Arc::clone(&self.state);
        let replier = Arc::clone(&self.replier);
        let events = self.event_sender.clone();
        let room_id = self.room_id.clone();

        self.emit(ChatEvent::ReplyStarted);

        let reply_task = runtime.spawn(async move { replier.reply(&input).await });

        runtime.spawn(async move {
            let outcome = reply_task.await;

            let mut guard = state.lock();
            if guard.generation != generation {
                debug!("Dropping reply for reloaded room {}", room_id);
                return;
            }
            guard.reply_pending = false;

            let content = match outcome {
                Ok(content) => content,
                Err(e) => {
                    error!("Reply task for room {} failed: {}", room_id, e);
                    return;
                }
            };

            let reply = guard.store.append(Sender::Agent, content, Utc::now()).clone();
            drop(guard);

            debug!("Appended agent reply {} to room {}", reply.id, room_id);
            let _ = events.send(ChatEvent::ReplyReceived(reply));
        });
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        let state = self.state.lock();
        WindowSnapshot {
            messages: state.store.visible_window().to_vec(),
            total: state.store.len(),
            has_more: state.store.has_more(),
            initial_loading: state.initial_loading,
            loading_older: state.loading_older,
            reply_pending: state.reply_pending,
        }
    }

    pub fn visible_window(&self) -> Vec<Message> {
        self.state.lock().store.visible_window().to_vec()
    }

    pub fn history(&self) -> Vec<Message> {
        self.state.lock().store.history().to_vec()
    }

    pub fn page_count(&self) -> usize {
        self.state.lock().store.page_count()
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().store.has_more()
    }

    pub fn is_loading_older(&self) -> bool {
        self.state.lock().loading_older
    }

    /// The "typing" indicator
    pub fn is_reply_pending(&self) -> bool {
        self.state.lock().reply_pending
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.event_sender.send(event);
    }
}
