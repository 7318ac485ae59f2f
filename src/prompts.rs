//! Optional prompt text sources for the streaming endpoint
//!
//! The system and user prompt live in plain text files next to the process.
//! Each is independently optional: a missing file yields an empty prompt,
//! and any other read failure is logged and likewise treated as "no prompt".
//! Loading never fails the caller.

use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

/// Prompt text injected into streaming chat requests. Either field may be
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSet {
    pub system: String,
    pub user: String,
}

impl PromptSet {
    /// Read both prompt files, tolerating absence and read failures.
    pub fn load(system_path: &Path, user_path: &Path) -> Self {
        Self {
            system: read_prompt(system_path),
            user: read_prompt(user_path),
        }
    }
}

fn read_prompt(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text.trim().to_string(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read prompt file");
            String::new()
        }
    }
}
