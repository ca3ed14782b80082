//! Outbound chat-platform clients

pub mod slack;

pub use slack::{SlackChannel, SlackMessage};
