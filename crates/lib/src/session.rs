//! Conversation session manager: live thread, history log, and the
//! send/receive lifecycle for one outgoing message.
//!
//! State is mirrored to the [`StateStore`] on every mutation. Persisted data
//! that fails to decode is replaced by defaults, and a failed relay round
//! degrades to a visible fallback message; neither surfaces an error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::gateway::Relay;
use crate::store::{StateStore, HISTORY_KEY, THEME_KEY, THREAD_KEY};

/// Greeting seeded into a fresh session's thread.
pub const SEED_GREETING: &str = "Hey there! I'm your assistant. How can I help you today?";
/// Greeting seeded by `new_chat`.
pub const NEW_CHAT_GREETING: &str = "Hey! How can I assist you today?";

const NO_REPLY_FALLBACK: &str = "Hmm, I didn't catch that.";
const RELAY_FAILURE_FALLBACK: &str = "Oops! API issue. Please try again later.";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message in the live thread. Immutable once created; `time` is a
/// display string captured at creation, never used for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub time: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            time: display_time(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            time: display_time(),
        }
    }
}

/// One completed question/answer round. Created only after a bot reply landed
/// in the thread; failed rounds never produce an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user: String,
    pub bot: String,
    pub time: String,
}

/// Current local time formatted for display.
fn display_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Decode a persisted thread. Missing, unparseable, or empty data falls back
/// to a single seed greeting so the thread is never empty after initialize.
fn decode_thread(raw: Option<&str>) -> Vec<Message> {
    let thread: Vec<Message> = raw
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();
    if thread.is_empty() {
        vec![Message::bot(SEED_GREETING)]
    } else {
        thread
    }
}

/// Decode a persisted history log. Anything that is not a sequence of
/// entries carrying `user`, `bot`, and `time` is discarded wholesale.
fn decode_history(raw: Option<&str>) -> Vec<HistoryEntry> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

fn decode_theme(raw: Option<&str>) -> bool {
    raw == Some("true")
}

/// Owns the session state and drives the send lifecycle.
///
/// All operations take `&mut self`, so a second `send` cannot start while one
/// is awaiting the relay; `pending` is the observable flag for a typing
/// indicator, not a concurrency guard.
pub struct SessionManager {
    store: StateStore,
    thread: Vec<Message>,
    history: Vec<HistoryEntry>,
    theme_dark: bool,
    pending: bool,
    reply_delay: Duration,
}

impl SessionManager {
    /// Read thread, history log, and theme flag from the store, substituting
    /// defaults for anything missing or malformed.
    pub async fn initialize(store: StateStore, reply_delay: Duration) -> Self {
        let thread = decode_thread(store.read(THREAD_KEY).await.as_deref());
        let history = decode_history(store.read(HISTORY_KEY).await.as_deref());
        let theme_dark = decode_theme(store.read(THEME_KEY).await.as_deref());
        Self {
            store,
            thread,
            history,
            theme_dark,
            pending: false,
            reply_delay,
        }
    }

    pub fn thread(&self) -> &[Message] {
        &self.thread
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn theme_dark(&self) -> bool {
        self.theme_dark
    }

    /// True while a send is between the user message and the bot reply.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Send one message through the relay and reconcile the thread.
    ///
    /// The user message is appended and persisted before the relay call; the
    /// bot message is committed only after both the relay result and the
    /// reveal delay have completed. A relay failure becomes a fallback bot
    /// message and skips the history entry.
    pub async fn send(&mut self, relay: &impl Relay, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.thread.push(Message::user(text));
        self.persist_thread().await;
        self.pending = true;

        let outcome = relay.relay(text).await;
        tokio::time::sleep(self.reply_delay).await;

        let (reply, failed) = match outcome {
            Ok(Some(reply)) => (reply, false),
            Ok(None) => (NO_REPLY_FALLBACK.to_string(), false),
            Err(e) => {
                log::warn!("relay failed: {}", e);
                (RELAY_FAILURE_FALLBACK.to_string(), true)
            }
        };

        self.thread.push(Message::bot(reply.clone()));
        self.persist_thread().await;

        if !failed {
            self.history.push(HistoryEntry {
                user: text.to_string(),
                bot: reply,
                time: display_time(),
            });
            self.persist_history().await;
        }
        self.pending = false;
    }

    /// Reset the thread to a single fresh greeting. The history log is untouched.
    pub async fn new_chat(&mut self) {
        self.thread = vec![Message::bot(NEW_CHAT_GREETING)];
        self.persist_thread().await;
    }

    /// Empty the thread and delete its store entry. The thread stays empty
    /// until the next `initialize` or `new_chat` re-seeds it.
    pub async fn clear_thread(&mut self) {
        self.thread.clear();
        if let Err(e) = self.store.remove(THREAD_KEY).await {
            log::warn!("removing persisted thread failed: {}", e);
        }
    }

    /// Empty the history log and delete its store entry.
    pub async fn clear_history(&mut self) {
        self.history.clear();
        if let Err(e) = self.store.remove(HISTORY_KEY).await {
            log::warn!("removing persisted history failed: {}", e);
        }
    }

    /// Replace the thread with the two messages reconstructed from a history
    /// entry, stamped with the current time (the entry keeps its own).
    pub async fn reopen(&mut self, entry: &HistoryEntry) {
        self.thread = vec![
            Message::user(entry.user.clone()),
            Message::bot(entry.bot.clone()),
        ];
        self.persist_thread().await;
    }

    pub async fn set_theme(&mut self, dark: bool) {
        self.theme_dark = dark;
        let value = if dark { "true" } else { "false" };
        if let Err(e) = self.store.write(THEME_KEY, value).await {
            log::warn!("persisting theme failed: {}", e);
        }
    }

    async fn persist_thread(&self) {
        match serde_json::to_string(&self.thread) {
            Ok(json) => {
                if let Err(e) = self.store.write(THREAD_KEY, &json).await {
                    log::warn!("persisting thread failed: {}", e);
                }
            }
            Err(e) => log::warn!("serializing thread failed: {}", e),
        }
    }

    async fn persist_history(&self) {
        match serde_json::to_string(&self.history) {
            Ok(json) => {
                if let Err(e) = self.store.write(HISTORY_KEY, &json).await {
                    log::warn!("persisting history failed: {}", e);
                }
            }
            Err(e) => log::warn!("serializing history failed: {}", e),
        }
    }
}
