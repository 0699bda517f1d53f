// src/models/dimension.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lookup table row for quiz topics (Python, R, AI, ...).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
}

/// Lookup table row for difficulty levels (easy, medium, hard).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Difficulty {
    pub id: i64,
    pub name: String,
}
