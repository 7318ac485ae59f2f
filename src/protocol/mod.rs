//! Core protocol types shared by the endpoints and providers

pub mod types;

pub use types::{ChatRequest, Message, Role, StreamFragment};
