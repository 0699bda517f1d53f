// src/views/content.rs

use crate::client::{ApiClient, Session};
use crate::models::{
    dimension::{Difficulty, Topic},
    quiz::{CreateQuizRequest, NewOption, QuizDetail},
};

use super::Page;

/// The content management page. Admin only; a non-admin visitor gets the
/// page shell with `authorized = false` and no data.
#[derive(Debug, Default)]
pub struct ContentView {
    pub authorized: bool,
    pub quizzes: Vec<QuizDetail>,
    pub topics: Vec<Topic>,
    pub difficulties: Vec<Difficulty>,
}

/// Raw create-quiz form input before presence checks.
#[derive(Debug, Default, Clone)]
pub struct CreateQuizForm {
    pub question_text: String,
    pub topic_id: i64,
    pub difficulty_id: i64,
    /// (option text, is_correct). Empty texts are dropped.
    pub options: Vec<(String, bool)>,
}

/// Loads the page, honoring the topic/difficulty listing filters.
pub async fn load(
    client: &ApiClient,
    session: &mut Session,
    topic_filter: Option<&str>,
    difficulty_filter: Option<&str>,
) -> Page<ContentView> {
    if !session.is_authenticated() {
        return Page::Login;
    }

    if !session.is_admin() {
        session.push_message("Only administrators can manage content.");
        return Page::Ready(ContentView::default());
    }

    let quizzes = client
        .quizzes(session, topic_filter, difficulty_filter)
        .await
        .unwrap_or_default();
    let topics = client.topics(session).await.unwrap_or_default();
    let difficulties = client.difficulties(session).await.unwrap_or_default();

    Page::Ready(ContentView {
        authorized: true,
        quizzes,
        topics,
        difficulties,
    })
}

/// Form action: creates a quiz from the form input.
///
/// Presence checks only: a question and at least two non-empty options,
/// one of them marked correct. Everything else is the backend's call.
pub async fn create_quiz(
    client: &ApiClient,
    session: &mut Session,
    form: CreateQuizForm,
) -> bool {
    if !session.is_authenticated() || !session.is_admin() {
        return false;
    }

    if form.question_text.trim().is_empty() {
        session.push_message("Please fill in the question.");
        return false;
    }

    let options: Vec<NewOption> = form
        .options
        .into_iter()
        .filter(|(text, _)| !text.trim().is_empty())
        .map(|(text, is_correct)| NewOption { text, is_correct })
        .collect();

    if options.len() < 2 {
        session.push_message("Please fill in at least two options.");
        return false;
    }
    if options.iter().filter(|o| o.is_correct).count() != 1 {
        session.push_message("Please mark exactly one option as correct.");
        return false;
    }

    let request = CreateQuizRequest {
        question_text: form.question_text,
        topic_id: form.topic_id,
        difficulty_id: form.difficulty_id,
        options,
    };

    client.create_quiz(session, &request).await.is_some()
}

/// Form action: deletes (deactivates) a quiz.
pub async fn delete_quiz(client: &ApiClient, session: &mut Session, quiz_id: i64) -> bool {
    if !session.is_authenticated() || !session.is_admin() {
        return false;
    }

    client.delete_quiz(session, quiz_id).await
}
