//! coach-quinn, a rowing coach assistant.
//!
//! Builds coaching prompts from a persona profile and a workout log, sends
//! them to a completion model, and posts the answer to chat. Workouts can
//! be logged to a spreadsheet from the chat bot.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod coach;
pub mod config;
pub mod error;
pub mod logging;
pub mod profile;
pub mod prompt;
pub mod providers;
pub mod publisher;
pub mod recency;
pub mod sheets;
pub mod telegram;
pub mod training_log;
