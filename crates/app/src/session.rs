use shared_types::AdminUser;

/// What the client knows about the admin session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Not probed yet.
    #[default]
    Unknown,
    Anonymous,
    Authenticated(AdminUser),
}

impl SessionState {
    pub fn admin(&self) -> Option<&AdminUser> {
        match self {
            SessionState::Authenticated(admin) => Some(admin),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// What the dashboard route should show.
#[derive(Debug, Clone, PartialEq)]
pub enum GateView {
    Loading,
    RedirectToLogin,
    Granted(AdminUser),
}

/// Guards the admin dashboard.
pub struct AuthGate;

impl AuthGate {
    pub fn decide(state: &SessionState) -> GateView {
        match state {
            SessionState::Unknown => GateView::Loading,
            SessionState::Anonymous => GateView::RedirectToLogin,
            SessionState::Authenticated(admin) => GateView::Granted(admin.clone()),
        }
    }

    /// Wait until the session is known and decide once.
    pub async fn wait(
        rx: &mut tokio::sync::watch::Receiver<SessionState>,
    ) -> GateView {
        match rx.wait_for(|s| *s != SessionState::Unknown).await {
            Ok(state) => Self::decide(&state),
            // Sender gone: the client shut down.
            Err(_) => GateView::RedirectToLogin,
        }
    }
}
