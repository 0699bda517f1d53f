// src/views/statistics.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::client::{ApiClient, Session};
use crate::models::score::{ScoreEntry, UserStats};

use super::Page;

/// One point of the daily evolution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub score: f64,
    pub quizzes: i64,
}

/// Per-topic aggregation for the comparison chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicPerformance {
    pub topic: String,
    pub average_score: f64,
    pub quizzes: i64,
}

#[derive(Debug, Default)]
pub struct StatisticsView {
    pub stats: UserStats,
    pub daily_evolution: Vec<DailyPoint>,
    pub topic_performance: Vec<TopicPerformance>,
}

/// Groups score history by calendar day, oldest first.
pub fn daily_evolution(scores: &[ScoreEntry]) -> Vec<DailyPoint> {
    let mut by_day: BTreeMap<NaiveDate, (f64, i64)> = BTreeMap::new();
    for entry in scores {
        let day = entry.timestamp.date_naive();
        let slot = by_day.entry(day).or_default();
        slot.0 += entry.score;
        slot.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (score, quizzes))| DailyPoint {
            date,
            score,
            quizzes,
        })
        .collect()
}

/// Averages score history per topic, best average first.
pub fn topic_performance(scores: &[ScoreEntry]) -> Vec<TopicPerformance> {
    let mut by_topic: BTreeMap<String, (f64, i64)> = BTreeMap::new();
    for entry in scores {
        let topic = entry.topic.clone().unwrap_or_else(|| "N/A".to_string());
        let slot = by_topic.entry(topic).or_default();
        slot.0 += entry.score;
        slot.1 += 1;
    }

    let mut performance: Vec<TopicPerformance> = by_topic
        .into_iter()
        .map(|(topic, (total, quizzes))| TopicPerformance {
            topic,
            average_score: total / quizzes as f64,
            quizzes,
        })
        .collect();
    performance.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
    performance
}

/// Loads the statistics page.
pub async fn load(client: &ApiClient, session: &mut Session) -> Page<StatisticsView> {
    if !session.is_authenticated() {
        return Page::Login;
    }

    let stats = client.my_stats(session).await.unwrap_or_default();
    let scores = client.my_scores(session).await.unwrap_or_default();

    Page::Ready(StatisticsView {
        stats,
        daily_evolution: daily_evolution(&scores),
        topic_performance: topic_performance(&scores),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn score(topic: &str, points: f64, day: u32, hour: u32) -> ScoreEntry {
        ScoreEntry {
            id: 1,
            score: points,
            quiz_id: Some(1),
            question_text: None,
            topic: Some(topic.to_string()),
            difficulty: None,
            timestamp: Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn daily_evolution_merges_same_day() {
        let scores = vec![
            score("Python", 10.0, 1, 9),
            score("Python", 0.0, 1, 18),
            score("R", 10.0, 2, 12),
        ];
        let daily = daily_evolution(&scores);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].score, 10.0);
        assert_eq!(daily[0].quizzes, 2);
        assert_eq!(daily[1].quizzes, 1);
    }

    #[test]
    fn topic_performance_averages() {
        let scores = vec![
            score("Python", 10.0, 1, 9),
            score("Python", 0.0, 2, 9),
            score("R", 10.0, 3, 9),
        ];
        let perf = topic_performance(&scores);
        assert_eq!(perf[0].topic, "R");
        assert_eq!(perf[0].average_score, 10.0);
        assert_eq!(perf[1].topic, "Python");
        assert_eq!(perf[1].average_score, 5.0);
    }
}
