use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::movie_store::MovieCode;

/// step of the administrator's add/delete flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AdminMode {
    #[default]
    None,
    AwaitingAddCode,
    AwaitingAddTitle {
        code: MovieCode,
    },
    AwaitingDeleteCode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSession {
    pub activated: bool,
    /// code found for the user but withheld until the subscription check passes
    pub pending_code: Option<MovieCode>,
    pub admin_mode: AdminMode,
}

impl UserSession {
    /// code captured in the add flow before its title arrives
    pub fn admin_scratch(&self) -> Option<&MovieCode> {
        match &self.admin_mode {
            AdminMode::AwaitingAddTitle { code } => Some(code),
            _ => None,
        }
    }

    pub fn in_admin_flow(&self) -> bool {
        self.admin_mode != AdminMode::None
    }
}

#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<i64, UserSession>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_session(&self, user_id: i64) -> UserSession {
        let sessions = self.sessions.lock().await;
        sessions.get(&user_id).cloned().unwrap_or_default()
    }

    pub async fn set_session(&self, user_id: i64, session: UserSession) {
        let mut sessions = self.sessions.lock().await;
        if session == UserSession::default() {
            sessions.remove(&user_id);
        } else {
            sessions.insert(user_id, session);
        }
    }
}

#[cfg(test)]
impl SessionManager {
    async fn clear_session(&self, user_id: i64) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(&user_id);
    }

    async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
