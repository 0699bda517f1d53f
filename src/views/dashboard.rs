// src/views/dashboard.rs

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::client::{ApiClient, Session};
use crate::models::{quiz::QuizDetail, score::Activity, score::ScoreEntry};

use super::Page;

/// Experience levels derived from the total score.
pub fn level_for_score(total_score: f64) -> &'static str {
    if total_score < 50.0 {
        "Beginner"
    } else if total_score < 150.0 {
        "Intermediate"
    } else if total_score < 300.0 {
        "Advanced"
    } else {
        "Expert"
    }
}

/// The four metric cards at the top of the dashboard.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub total_score: f64,
    pub quizzes_completed: i64,
    pub level: &'static str,
    pub accuracy: f64,
}

impl Metrics {
    fn empty() -> Self {
        Self {
            level: level_for_score(0.0),
            ..Self::default()
        }
    }
}

/// One point of the weekly progress chart.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPoint {
    /// ISO week label, e.g. "2026-W35".
    pub week: String,
    pub score: f64,
}

/// One slice of the score-by-topic distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicShare {
    pub topic: String,
    pub score: f64,
}

#[derive(Debug, Default)]
pub struct DashboardView {
    pub metrics: Metrics,
    pub weekly_progress: Vec<WeeklyPoint>,
    pub topic_distribution: Vec<TopicShare>,
    pub recent_activities: Vec<Activity>,
    pub upcoming: Vec<QuizDetail>,
}

/// Groups score history by ISO week, oldest week first.
pub fn weekly_progress(scores: &[ScoreEntry]) -> Vec<WeeklyPoint> {
    let mut by_week: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for entry in scores {
        let week = entry.timestamp.iso_week();
        *by_week.entry((week.year(), week.week())).or_default() += entry.score;
    }

    by_week
        .into_iter()
        .map(|((year, week), score)| WeeklyPoint {
            week: format!("{year}-W{week:02}"),
            score,
        })
        .collect()
}

/// Sums score history per topic, largest share first.
pub fn topic_distribution(scores: &[ScoreEntry]) -> Vec<TopicShare> {
    let mut by_topic: BTreeMap<String, f64> = BTreeMap::new();
    for entry in scores {
        let topic = entry.topic.clone().unwrap_or_else(|| "N/A".to_string());
        *by_topic.entry(topic).or_default() += entry.score;
    }

    let mut shares: Vec<TopicShare> = by_topic
        .into_iter()
        .map(|(topic, score)| TopicShare { topic, score })
        .collect();
    shares.sort_by(|a, b| b.score.total_cmp(&a.score));
    shares
}

/// Loads the dashboard page.
pub async fn load(client: &ApiClient, session: &mut Session) -> Page<DashboardView> {
    if !session.is_authenticated() {
        return Page::Login;
    }

    let metrics = match client.my_stats(session).await {
        Some(stats) => Metrics {
            total_score: stats.total_score,
            quizzes_completed: stats.quizzes_completed,
            level: level_for_score(stats.total_score),
            accuracy: stats.accuracy,
        },
        None => Metrics::empty(),
    };

    let scores = client.my_scores(session).await.unwrap_or_default();
    let recent_activities = client.my_activities(session, 10).await.unwrap_or_default();
    let upcoming = client
        .available_quizzes(session, Some(3))
        .await
        .unwrap_or_default();

    Page::Ready(DashboardView {
        metrics,
        weekly_progress: weekly_progress(&scores),
        topic_distribution: topic_distribution(&scores),
        recent_activities,
        upcoming,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn score(topic: &str, points: f64, day: u32) -> ScoreEntry {
        ScoreEntry {
            id: 1,
            score: points,
            quiz_id: Some(1),
            question_text: None,
            topic: Some(topic.to_string()),
            difficulty: Some("easy".to_string()),
            timestamp: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(level_for_score(0.0), "Beginner");
        assert_eq!(level_for_score(49.9), "Beginner");
        assert_eq!(level_for_score(50.0), "Intermediate");
        assert_eq!(level_for_score(150.0), "Advanced");
        assert_eq!(level_for_score(300.0), "Expert");
    }

    #[test]
    fn weekly_progress_groups_by_iso_week() {
        // Jan 5 and Jan 7 of 2026 share a week; Jan 14 is two weeks later.
        let scores = vec![score("Python", 10.0, 5), score("R", 10.0, 7), score("AI", 10.0, 14)];
        let weekly = weekly_progress(&scores);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].score, 20.0);
        assert_eq!(weekly[1].score, 10.0);
    }

    #[test]
    fn topic_distribution_sorts_descending() {
        let scores = vec![
            score("Python", 10.0, 1),
            score("R", 30.0, 2),
            score("Python", 10.0, 3),
        ];
        let shares = topic_distribution(&scores);
        assert_eq!(shares[0].topic, "R");
        assert_eq!(shares[0].score, 30.0);
        assert_eq!(shares[1].topic, "Python");
        assert_eq!(shares[1].score, 20.0);
    }
}
