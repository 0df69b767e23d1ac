//! Mindful: a terminal client for the Mindful Chat and PC game recommender
//! endpoints.
pub mod chat;
pub mod cli;
pub mod client;
pub mod config;
pub mod fallback;
pub mod logging;
pub mod persistence;
pub mod recommend;
pub mod render;
pub mod safety;
pub mod storage;
