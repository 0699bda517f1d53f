// src/views/admin.rs

use crate::client::{ApiClient, Session};
use crate::models::{score::SystemStats, user::User};

use super::Page;

/// The administration page. Admin only; a non-admin visitor gets the
/// page shell with `authorized = false` and no data.
#[derive(Debug, Default)]
pub struct AdminView {
    pub authorized: bool,
    pub users: Vec<User>,
    pub stats: SystemStats,
}

/// Loads the administration page with optional user search/role filters.
pub async fn load(
    client: &ApiClient,
    session: &mut Session,
    search: Option<&str>,
    role: Option<&str>,
) -> Page<AdminView> {
    if !session.is_authenticated() {
        return Page::Login;
    }

    if !session.is_admin() {
        session.push_message("Only administrators can access this page.");
        return Page::Ready(AdminView::default());
    }

    let users = client
        .admin_users(session, search, role)
        .await
        .unwrap_or_default();
    let stats = client.admin_stats(session).await.unwrap_or_default();

    Page::Ready(AdminView {
        authorized: true,
        users,
        stats,
    })
}

/// Form action: creates a user with an explicit role.
/// Presence checks only; the backend validates the rest.
pub async fn create_user(
    client: &ApiClient,
    session: &mut Session,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> bool {
    if !session.is_authenticated() || !session.is_admin() {
        return false;
    }

    if username.is_empty() || email.is_empty() || password.is_empty() {
        session.push_message("Please fill in username, email and password.");
        return false;
    }

    client
        .admin_create_user(session, username, email, password, role)
        .await
}

/// Form action: edits a user's role, password or active flag.
pub async fn update_user(
    client: &ApiClient,
    session: &mut Session,
    user_id: i64,
    role: Option<&str>,
    password: Option<&str>,
    is_active: Option<bool>,
) -> bool {
    if !session.is_authenticated() || !session.is_admin() {
        return false;
    }

    if role.is_none() && password.is_none() && is_active.is_none() {
        session.push_message("Nothing to update.");
        return false;
    }

    client
        .admin_update_user(session, user_id, role, password, is_active)
        .await
}

/// Form action: deactivates a user account.
pub async fn deactivate_user(client: &ApiClient, session: &mut Session, user_id: i64) -> bool {
    if !session.is_authenticated() || !session.is_admin() {
        return false;
    }

    client.admin_deactivate_user(session, user_id).await
}
