// src/views/mod.rs
//
// One module per page. Each `load` fetches through the API wrapper,
// transforms the responses into a typed view model and nothing else;
// a failed fetch yields the empty/default section of the page.

pub mod admin;
pub mod content;
pub mod dashboard;
pub mod leaderboard;
pub mod profile;
pub mod quizzes;
pub mod statistics;

/// Result of loading a protected page: either the login/registration
/// form (unauthenticated session) or the page's view model.
#[derive(Debug)]
pub enum Page<T> {
    Login,
    Ready(T),
}

impl<T> Page<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Page::Ready(view) => Some(view),
            Page::Login => None,
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, Page::Login)
    }
}
