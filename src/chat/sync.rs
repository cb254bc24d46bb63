use super::types::{Channel, Message, NewChannel, NewMessage};
use crate::api::ApiClient;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// View-facing snapshot of the chat for the bound team. `messages` is always
/// the last list that was fetched successfully; a failed pass sets `error`
/// without touching it.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub channel_id: Option<i64>,
    pub messages: Vec<Message>,
    pub error: Option<String>,
}

struct PollSession {
    team_id: i64,
    handle: JoinHandle<()>,
}

/// Keeps a team's chat approximately in sync with the server by re-fetching
/// the channel and its messages on a fixed interval, lazily creating the
/// team's default channel when none exists yet.
pub struct ChatSync {
    api: Arc<ApiClient>,
    state: Arc<RwLock<ChatState>>,
    // Sync mutex so Drop can always reach the handle; never held across await
    session: Mutex<Option<PollSession>>,
    poll_interval: Duration,
}

impl ChatSync {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self::with_interval(api, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(api: Arc<ApiClient>, poll_interval: Duration) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ChatState::default())),
            session: Mutex::new(None),
            poll_interval,
        }
    }

    /// Starts polling for the given team. Rebinding the same team is a no-op;
    /// a different team aborts the old session task, which also cancels any
    /// request it still has in flight, and resets state so nothing bleeds
    /// across teams.
    pub async fn bind(&self, team_id: i64) {
        {
            let mut session = self.session.lock().unwrap();
            if let Some(current) = session.as_ref() {
                if current.team_id == team_id {
                    return;
                }
            }
            if let Some(old) = session.take() {
                old.handle.abort();
            }
        }
        *self.state.write().await = ChatState::default();

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let poll_interval = self.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            // A slow round trip must not produce a burst of catch-up passes
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                Self::sync_once(&api, team_id, &state).await;
            }
        });
        let stale = self
            .session
            .lock()
            .unwrap()
            .replace(PollSession { team_id, handle });
        if let Some(stale) = stale {
            stale.handle.abort();
        }
    }

    /// Stops the poll session and clears the view state.
    pub async fn unbind(&self) {
        if let Some(old) = self.session.lock().unwrap().take() {
            old.handle.abort();
        }
        *self.state.write().await = ChatState::default();
    }

    pub async fn snapshot(&self) -> ChatState {
        self.state.read().await.clone()
    }

    /// Posts a message to the resolved channel, then runs one extra sync pass
    /// right away so the sender sees their message before the next tick.
    /// Returns `Ok(false)` without any network call when no channel is
    /// resolved yet or the content is blank.
    pub async fn send(&self, content: &str) -> Result<bool, String> {
        if content.trim().is_empty() {
            return Ok(false);
        }
        let team_id = match self.session.lock().unwrap().as_ref() {
            Some(session) => session.team_id,
            None => return Ok(false),
        };
        let channel_id = match self.state.read().await.channel_id {
            Some(id) => id,
            None => return Ok(false),
        };

        let body = serde_json::to_value(NewMessage {
            channel: channel_id,
            contenido: content.to_string(),
        })
        .map_err(|e| format!("Failed to serialize message: {}", e))?;

        self.api
            .post("/messages/", &body)
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;

        Self::sync_once(&self.api, team_id, &self.state).await;
        Ok(true)
    }

    async fn sync_once(api: &ApiClient, team_id: i64, state: &RwLock<ChatState>) {
        let channels = match api.get(&format!("/channels/?team={}", team_id)).await {
            Ok(value) => match serde_json::from_value::<Vec<Channel>>(value) {
                Ok(channels) => channels,
                Err(e) => {
                    state.write().await.error =
                        Some(format!("Unexpected channel list payload: {}", e));
                    return;
                }
            },
            Err(e) => {
                state.write().await.error = Some(format!("Failed to load channels: {}", e));
                return;
            }
        };

        // Lowest id keeps every client on the same default channel even when
        // duplicates exist server-side
        let channel_id = match channels.iter().map(|c| c.id).min() {
            Some(id) => id,
            None => {
                let known = state.read().await.channel_id;
                match known {
                    // A transiently empty list must not provision a duplicate
                    Some(id) => id,
                    None => match Self::provision_channel(api, team_id).await {
                        Ok(channel) => channel.id,
                        Err(e) => {
                            state.write().await.error = Some(e);
                            return;
                        }
                    },
                }
            }
        };

        match api.get(&format!("/messages/?channel={}", channel_id)).await {
            Ok(value) => {
                // A fresh channel may come back as null rather than []
                let parsed = if value.is_null() {
                    Ok(Vec::new())
                } else {
                    serde_json::from_value::<Vec<Message>>(value)
                };
                match parsed {
                    Ok(messages) => {
                        let mut state = state.write().await;
                        state.channel_id = Some(channel_id);
                        state.messages = messages;
                        state.error = None;
                    }
                    Err(e) => {
                        let mut state = state.write().await;
                        state.channel_id = Some(channel_id);
                        state.error = Some(format!("Unexpected message list payload: {}", e));
                    }
                }
            }
            Err(e) => {
                let mut state = state.write().await;
                state.channel_id = Some(channel_id);
                state.error = Some(format!("Failed to load messages: {}", e));
            }
        }
    }

    async fn provision_channel(api: &ApiClient, team_id: i64) -> Result<Channel, String> {
        let body = serde_json::to_value(NewChannel::default_for_team(team_id))
            .map_err(|e| format!("Failed to serialize channel: {}", e))?;
        match api.post("/channels/", &body).await {
            Ok(value) => serde_json::from_value(value)
                .map_err(|e| format!("Unexpected create-channel payload: {}", e)),
            Err(e) => Err(format!("Failed to create team channel: {}", e)),
        }
    }
}

impl Drop for ChatSync {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.lock() {
            if let Some(session) = session.take() {
                session.handle.abort();
            }
        }
    }
}
