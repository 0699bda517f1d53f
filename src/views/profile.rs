// src/views/profile.rs

use crate::client::{ApiClient, Session, Theme};
use crate::models::{
    score::UserStats,
    user::{UpdateProfileRequest, User},
};

use super::dashboard::level_for_score;
use super::Page;

/// The profile page: account card, quick performance numbers and the
/// theme preference switch.
#[derive(Debug, Default)]
pub struct ProfileView {
    pub user: Option<User>,
    /// Month and year of account creation, e.g. "Mar 2026".
    pub member_since: Option<String>,
    pub level: &'static str,
    pub stats: UserStats,
    pub theme: Theme,
}

/// Loads the profile page. The profile card is refreshed from the
/// backend rather than the cached session user.
pub async fn load(client: &ApiClient, session: &mut Session) -> Page<ProfileView> {
    if !session.is_authenticated() {
        return Page::Login;
    }

    let user = client.me(session).await;
    let stats = client.my_stats(session).await.unwrap_or_default();

    let member_since = user
        .as_ref()
        .and_then(|u| u.created_at)
        .map(|ts| ts.format("%b %Y").to_string());

    Page::Ready(ProfileView {
        user,
        member_since,
        level: level_for_score(stats.total_score),
        stats,
        theme: session.theme,
    })
}

/// Form action: switches the visitor's theme preference.
pub fn switch_theme(session: &mut Session, theme: Theme) {
    session.set_theme(theme);
}

/// Form action: saves edited profile fields. Returns the updated user
/// when the backend accepted the change.
pub async fn update_profile(
    client: &ApiClient,
    session: &mut Session,
    request: &UpdateProfileRequest,
) -> Option<User> {
    if !session.is_authenticated() {
        return None;
    }

    let updated = client.update_me(session, request).await;
    if updated.is_some() {
        session.push_message("Profile updated.");
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn member_since_formats_month_and_year() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        assert_eq!(ts.format("%b %Y").to_string(), "Mar 2026");
    }
}
