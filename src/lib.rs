//! sleep-coach
//!
//! Backend for a sleep-tracking wellness app. The interesting part lives in
//! [`pipeline`]: each endpoint gathers a user's recent sleep context from the
//! hosted store, renders it into a prompt, asks the model for a strictly
//! JSON-shaped answer, persists the result, and returns it. [`http`] is a
//! thin axum surface; [`store`] and [`llm`] are the pluggable transports
//! behind it.

pub mod config;
pub mod http;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod store;

#[cfg(test)]
pub mod test_utils;
