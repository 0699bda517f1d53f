// src/views/quizzes.rs

use crate::client::{ApiClient, Session};
use crate::models::{
    quiz::{AnswerResponse, QuizDetail},
    score::UserStats,
};

use super::Page;

#[derive(Debug, Default)]
pub struct QuizzesView {
    /// Quizzes the visitor has not completed yet.
    pub available: Vec<QuizDetail>,
    /// The quiz currently shown, if any remain.
    pub selected: Option<QuizDetail>,
    /// Stats footer under the quiz card.
    pub stats: UserStats,
}

/// Loads the interactive quiz page.
///
/// Prefers the quiz remembered on the session; otherwise falls back to
/// the first available one.
pub async fn load(client: &ApiClient, session: &mut Session) -> Page<QuizzesView> {
    if !session.is_authenticated() {
        return Page::Login;
    }

    let available = client
        .available_quizzes(session, None)
        .await
        .unwrap_or_default();

    let selected_id = session
        .selected_quiz
        .filter(|id| available.iter().any(|q| q.id == *id))
        .or_else(|| available.first().map(|q| q.id));
    session.selected_quiz = selected_id;

    let selected = match selected_id {
        Some(id) => client.quiz(session, id).await,
        None => None,
    };

    let stats = client.my_stats(session).await.unwrap_or_default();

    Page::Ready(QuizzesView {
        available,
        selected,
        stats,
    })
}

/// Form action: submits the chosen option for the selected quiz.
///
/// On success the selection is cleared so the next render offers a new
/// quiz. Returns `None` when unauthenticated or the API is unavailable.
pub async fn submit_answer(
    client: &ApiClient,
    session: &mut Session,
    quiz_id: i64,
    option_id: i64,
) -> Option<AnswerResponse> {
    if !session.is_authenticated() {
        return None;
    }

    let result = client.answer(session, quiz_id, option_id).await;

    if result.is_some() {
        session.selected_quiz = None;
    }

    result
}
