//! Append-only, line-oriented output sink for a deploy job.
//!
//! The executor writes its human-readable transcript here; callers read it
//! back as the job's log. Cloneable and shareable across tasks — every clone
//! appends to the same transcript.

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct JobOutput {
    lines: Arc<Mutex<Vec<String>>>,
}

impl JobOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line. Embedded newlines split into multiple lines, so the
    /// transcript stays line-oriented no matter how callers format.
    pub fn puts(&self, line: impl AsRef<str>) {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        for part in line.as_ref().split('\n') {
            lines.push(part.to_string());
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The full transcript, newline-joined.
    pub fn transcript(&self) -> String {
        self.lines().join("\n")
    }
}
