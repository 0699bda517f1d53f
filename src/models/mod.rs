// src/models/mod.rs

pub mod company;
pub mod dimension;
pub mod quiz;
pub mod score;
pub mod user;
