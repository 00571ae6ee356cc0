//! Huddle: meeting transcript analysis backed by a hosted LLM.
//!
//! A transcript flows through four stages (understanding, action items,
//! follow-ups and on-demand Q&A). Each stage builds a prompt, asks the
//! provider to generate text and normalizes the reply into typed data.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod global;
pub mod meeting;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod session;

pub use error::{AssistantError, Result};
