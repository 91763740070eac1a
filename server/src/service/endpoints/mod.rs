//! Endpoint handlers organized by domain

pub mod chat;
pub mod game;
pub mod moves;
