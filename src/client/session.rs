// src/client/session.rs

use crate::models::user::User;

/// UI theme preference carried with the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Request-scoped session context.
///
/// Everything a page needs to know about the current visitor travels in
/// this value instead of ambient global state: the authentication flag,
/// the bearer token, the cached profile, the theme preference and the
/// quiz the visitor is working on.
#[derive(Debug, Clone, Default)]
pub struct Session {
    authenticated: bool,
    access_token: Option<String>,
    current_user: Option<User>,
    /// Set when a 401 ended this cycle; later requests are skipped.
    halted: bool,
    messages: Vec<String>,
    pub theme: Theme,
    pub selected_quiz: Option<i64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The gate every protected page consults before rendering.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|u| u.role == "admin")
    }

    /// Stores a successful login/registration outcome.
    pub fn store_auth(&mut self, token: String, user: User) {
        self.authenticated = true;
        self.access_token = Some(token);
        self.current_user = Some(user);
    }

    /// Drops all authentication state. Idempotent.
    pub fn clear_auth(&mut self) {
        self.authenticated = false;
        self.access_token = None;
        self.current_user = None;
    }

    /// Replaces the cached profile after a profile update round-trip.
    pub fn update_user(&mut self, user: User) {
        self.current_user = Some(user);
    }

    /// Switches the UI theme. The preference outlives the login: it is
    /// untouched by `clear_auth` and new request cycles.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Marks the current request cycle as ended by a 401. No further
    /// requests go out until the next cycle begins.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Starts a fresh request cycle (a new page render).
    pub fn begin_cycle(&mut self) {
        self.halted = false;
    }

    /// Queues a user-facing message (errors, session expiry notes).
    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Drains the queued messages for display.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_unauthenticated() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(!session.is_admin());
    }

    #[test]
    fn theme_preference_survives_auth_expiry() {
        let mut session = Session::new();
        session.set_theme(Theme::Dark);

        session.clear_auth();
        session.begin_cycle();

        assert_eq!(session.theme, Theme::Dark);
    }

    #[test]
    fn halt_is_reset_by_a_new_cycle() {
        let mut session = Session::new();
        session.halt();
        assert!(session.is_halted());
        session.begin_cycle();
        assert!(!session.is_halted());
    }
}
