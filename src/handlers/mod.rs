// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod leaderboard;
pub mod ml;
pub mod profile;
pub mod quiz;
