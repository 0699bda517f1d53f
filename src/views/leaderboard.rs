// src/views/leaderboard.rs

use crate::client::{ApiClient, Session};
use crate::models::score::LeaderboardEntry;

use super::Page;

#[derive(Debug, Default)]
pub struct LeaderboardView {
    /// Top three entries for the podium cards.
    pub podium: Vec<LeaderboardEntry>,
    /// Full ranking table, including the podium.
    pub ranking: Vec<LeaderboardEntry>,
    /// The visitor's own rank, when they appear in the ranking.
    pub my_position: Option<i64>,
    pub participants: usize,
    pub average_score: f64,
    pub top_score: f64,
}

/// Loads the leaderboard page.
pub async fn load(client: &ApiClient, session: &mut Session) -> Page<LeaderboardView> {
    if !session.is_authenticated() {
        return Page::Login;
    }

    let ranking = client.leaderboard(session, Some(20)).await.unwrap_or_default();

    let my_position = session.current_user().and_then(|user| {
        ranking
            .iter()
            .find(|entry| entry.username == user.username)
            .map(|entry| entry.rank)
    });

    let participants = ranking.len();
    let top_score = ranking.first().map(|e| e.total_score).unwrap_or(0.0);
    let average_score = if participants > 0 {
        ranking.iter().map(|e| e.total_score).sum::<f64>() / participants as f64
    } else {
        0.0
    };

    Page::Ready(LeaderboardView {
        podium: ranking.iter().take(3).cloned().collect(),
        ranking,
        my_position,
        participants,
        average_score,
        top_score,
    })
}
