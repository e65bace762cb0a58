use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::localization::Lang;
use crate::movie_store::{MovieCode, MovieStore, LIST_LIMIT};
use crate::subscription::SubscriptionOracle;
use crate::user_session::{AdminMode, SessionManager, UserSession};
use crate::utils::message_formatter::{MessageFormatter, MAX_MESSAGE_LENGTH};

// per-user locks so two updates from the same user never interleave on their session
pub type UserLocks = Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>;

/// a message the bot already sent, used as an edit target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Activate,
    CheckSubscription,
    AdminAddMovie,
    AdminListMovies,
    AdminDeleteMovie,
}

impl ButtonAction {
    pub fn callback_data(&self) -> &'static str {
        match self {
            ButtonAction::Activate => "activate",
            ButtonAction::CheckSubscription => "check_subs",
            ButtonAction::AdminAddMovie => "admin_add_movie",
            ButtonAction::AdminListMovies => "admin_list_movies",
            ButtonAction::AdminDeleteMovie => "admin_delete_movie",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "activate" => Some(ButtonAction::Activate),
            "check_subs" => Some(ButtonAction::CheckSubscription),
            "admin_add_movie" => Some(ButtonAction::AdminAddMovie),
            "admin_list_movies" => Some(ButtonAction::AdminListMovies),
            "admin_delete_movie" => Some(ButtonAction::AdminDeleteMovie),
            _ => None,
        }
    }

    fn is_admin_only(&self) -> bool {
        matches!(
            self,
            ButtonAction::AdminAddMovie
                | ButtonAction::AdminListMovies
                | ButtonAction::AdminDeleteMovie
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Start,
    AdminPanel,
    Text(String),
    Button {
        action: ButtonAction,
        message: MessageRef,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub sender_id: i64,
    pub chat_id: i64,
    pub lang: Lang,
    pub kind: EventKind,
}

/// inline keyboards the engine can attach; rendered by the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    Activate,
    Subscribe,
    AdminMenu,
}

/// HTML-formatted text plus an optional keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send { chat_id: i64, reply: Reply },
    Edit { message: MessageRef, reply: Reply },
    /// popup answer to the pressed button
    Alert { text: String },
}

/// routes one inbound event through the user's session and returns what to send back
pub struct ConversationEngine {
    store: Arc<MovieStore>,
    sessions: SessionManager,
    oracle: Arc<SubscriptionOracle>,
    admin_id: i64,
    user_locks: UserLocks,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<MovieStore>,
        sessions: SessionManager,
        oracle: Arc<SubscriptionOracle>,
        admin_id: i64,
    ) -> Self {
        Self {
            store,
            sessions,
            oracle,
            admin_id,
            user_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &Arc<MovieStore> {
        &self.store
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_id != 0 && user_id == self.admin_id
    }

    pub async fn handle(&self, event: Event) -> Vec<Action> {
        let user_lock = {
            let mut locks = self.user_locks.lock().await;
            locks
                .entry(event.sender_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let user_guard = user_lock.lock().await;

        let mut session = self.sessions.get_session(event.sender_id).await;
        debug!(
            "Handling {:?} from user {} (activated: {}, admin flow: {})",
            event.kind,
            event.sender_id,
            session.activated,
            session.in_admin_flow()
        );
        let actions = match &event.kind {
            EventKind::Start => self.handle_start(&event),
            EventKind::AdminPanel => self.handle_admin_panel(&event),
            EventKind::Text(text) => self.handle_text(&event, &mut session, text).await,
            EventKind::Button { action, message } => {
                self.handle_button(&event, &mut session, *action, *message)
                    .await
            }
        };
        self.sessions.set_session(event.sender_id, session).await;

        drop(user_guard);
        self.release_user_lock(event.sender_id, user_lock).await;

        actions
    }

    // the entry goes once only the table and this handler hold it
    async fn release_user_lock(&self, user_id: i64, user_lock: Arc<Mutex<()>>) {
        let mut locks = self.user_locks.lock().await;
        if Arc::strong_count(&user_lock) == 2 {
            locks.remove(&user_id);
        }
    }

    fn handle_start(&self, event: &Event) -> Vec<Action> {
        vec![Action::Send {
            chat_id: event.chat_id,
            reply: Reply::with_keyboard(event.lang.greeting(), Keyboard::Activate),
        }]
    }

    fn handle_admin_panel(&self, event: &Event) -> Vec<Action> {
        let reply = if self.is_admin(event.sender_id) {
            Reply::with_keyboard(event.lang.admin_panel(), Keyboard::AdminMenu)
        } else {
            info!("User {} was denied the admin panel", event.sender_id);
            Reply::text(event.lang.admin_access_denied())
        };
        vec![Action::Send {
            chat_id: event.chat_id,
            reply,
        }]
    }

    async fn handle_text(
        &self,
        event: &Event,
        session: &mut UserSession,
        text: &str,
    ) -> Vec<Action> {
        let text = text.trim();
        let is_admin = self.is_admin(event.sender_id);

        if is_admin {
            if let Some(reply) = self.handle_admin_text(event.lang, session, text).await {
                return vec![Action::Send {
                    chat_id: event.chat_id,
                    reply,
                }];
            }
        }

        if !session.activated && !is_admin {
            debug!("User {} sent text before activating", event.sender_id);
            return vec![Action::Send {
                chat_id: event.chat_id,
                reply: Reply::with_keyboard(event.lang.activation_required(), Keyboard::Activate),
            }];
        }

        let reply = self
            .handle_code_lookup(event.lang, event.sender_id, session, text)
            .await;
        vec![Action::Send {
            chat_id: event.chat_id,
            reply,
        }]
    }

    /// consumes the text when an admin flow is active, returns None otherwise
    async fn handle_admin_text(
        &self,
        lang: Lang,
        session: &mut UserSession,
        text: &str,
    ) -> Option<Reply> {
        let reply = match std::mem::take(&mut session.admin_mode) {
            AdminMode::None => return None,
            AdminMode::AwaitingAddCode => match MovieCode::parse(text) {
                Some(code) => {
                    let reply = Reply::text(
                        lang.admin_code_saved(&MessageFormatter::escape_html(code.as_str())),
                    );
                    session.admin_mode = AdminMode::AwaitingAddTitle { code };
                    reply
                }
                None => {
                    session.admin_mode = AdminMode::AwaitingAddCode;
                    Reply::text(lang.admin_code_empty())
                }
            },
            AdminMode::AwaitingAddTitle { code } => {
                let title = text.to_string();
                let reply = Reply::with_keyboard(
                    lang.admin_movie_added(
                        &MessageFormatter::escape_html(code.as_str()),
                        &MessageFormatter::escape_html(&title),
                    ),
                    Keyboard::AdminMenu,
                );
                self.store.put(code, title).await;
                reply
            }
            AdminMode::AwaitingDeleteCode => {
                let code = MovieCode::parse(text);
                let escaped_code =
                    MessageFormatter::escape_html(code.as_ref().map_or("", |c| c.as_str()));
                let removed = match &code {
                    Some(code) => self.store.delete(code.as_str()).await,
                    None => None,
                };
                let text = match removed {
                    Some(title) => lang
                        .admin_movie_deleted(&escaped_code, &MessageFormatter::escape_html(&title)),
                    None => lang.admin_movie_not_found(&escaped_code),
                };
                Reply::with_keyboard(text, Keyboard::AdminMenu)
            }
        };
        Some(reply)
    }

    async fn handle_code_lookup(
        &self,
        lang: Lang,
        user_id: i64,
        session: &mut UserSession,
        text: &str,
    ) -> Reply {
        let Some(code) = MovieCode::parse(text) else {
            return Reply::text(lang.code_not_found());
        };

        let Some(title) = self.store.get(code.as_str()).await else {
            debug!("User {} sent unknown code {}", user_id, code);
            return Reply::text(lang.code_not_found());
        };

        if !self.oracle.is_subscribed(user_id).await {
            info!(
                "User {} is not subscribed, holding code {} until confirmation",
                user_id, code
            );
            session.pending_code = Some(code);
            return Reply::with_keyboard(lang.subscribe_prompt(), Keyboard::Subscribe);
        }

        Reply::text(lang.movie_title(
            &MessageFormatter::escape_html(code.as_str()),
            &MessageFormatter::escape_html(&title),
        ))
    }

    async fn handle_button(
        &self,
        event: &Event,
        session: &mut UserSession,
        action: ButtonAction,
        message: MessageRef,
    ) -> Vec<Action> {
        let lang = event.lang;

        if action.is_admin_only() && !self.is_admin(event.sender_id) {
            info!(
                "User {} pressed admin button {:?} without access",
                event.sender_id, action
            );
            return vec![Action::Alert {
                text: lang.admin_no_access_alert().to_string(),
            }];
        }

        match action {
            ButtonAction::Activate => {
                if !session.activated {
                    info!("User {} activated the bot", event.sender_id);
                }
                session.activated = true;
                vec![Action::Edit {
                    message,
                    reply: Reply::text(lang.activated()),
                }]
            }
            ButtonAction::CheckSubscription => {
                self.handle_check_subscription(event, session, message)
                    .await
            }
            ButtonAction::AdminAddMovie => {
                session.admin_mode = AdminMode::AwaitingAddCode;
                vec![Action::Edit {
                    message,
                    reply: Reply::text(lang.admin_add_prompt()),
                }]
            }
            ButtonAction::AdminDeleteMovie => {
                session.admin_mode = AdminMode::AwaitingDeleteCode;
                vec![Action::Edit {
                    message,
                    reply: Reply::text(lang.admin_delete_prompt()),
                }]
            }
            ButtonAction::AdminListMovies => {
                let reply = self.render_movie_list(lang).await;
                vec![Action::Edit { message, reply }]
            }
        }
    }

    async fn handle_check_subscription(
        &self,
        event: &Event,
        session: &mut UserSession,
        message: MessageRef,
    ) -> Vec<Action> {
        let lang = event.lang;

        if !self.oracle.is_subscribed(event.sender_id).await {
            return vec![Action::Alert {
                text: lang.not_subscribed_alert().to_string(),
            }];
        }

        let text = match session.pending_code.take() {
            None => lang.subscription_confirmed().to_string(),
            Some(code) => match self.store.get(code.as_str()).await {
                Some(title) => lang.movie_title(
                    &MessageFormatter::escape_html(code.as_str()),
                    &MessageFormatter::escape_html(&title),
                ),
                None => {
                    info!(
                        "Pending code {} of user {} is no longer in the store",
                        code, event.sender_id
                    );
                    lang.pending_code_mismatch().to_string()
                }
            },
        };

        vec![Action::Edit {
            message,
            reply: Reply::text(text),
        }]
    }

    async fn render_movie_list(&self, lang: Lang) -> Reply {
        let movies = self.store.list_all(LIST_LIMIT).await;
        if movies.is_empty() {
            return Reply::with_keyboard(lang.admin_list_empty(), Keyboard::AdminMenu);
        }

        let lines: Vec<String> = movies
            .iter()
            .map(|(code, title)| {
                format!(
                    "<b>{}</b> — {}",
                    MessageFormatter::escape_html(code.as_str()),
                    MessageFormatter::escape_html(title)
                )
            })
            .collect();

        let (text, _) = MessageFormatter::append_lines_within_limit(
            &lang.admin_list_header(LIST_LIMIT),
            &lines,
            MAX_MESSAGE_LENGTH,
        );
        Reply::with_keyboard(text, Keyboard::AdminMenu)
    }
}
