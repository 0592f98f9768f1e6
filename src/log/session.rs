/// Session journal
///
/// Every operation performed through the engine is recorded with a
/// timestamp, an operation name, a detail string and a sequential order.
/// Undo and redo are themselves journaled, so the log is an append-only
/// audit trail rather than a mirror of the undo stack.
///
/// The log exports as human-readable text or JSON; persisting either is the
/// host's job, the core does no file I/O.
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single journal entry representing one operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sequential operation number (1-based)
    pub sequence: usize,
    /// Timestamp when the operation was performed
    pub timestamp: DateTime<Local>,
    /// Operation name (action tag, "Undo", "Redo", …)
    pub operation: String,
    /// Detail of what was done
    pub detail: String,
}

impl LogEntry {
    /// Format as a human-readable text line
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {} | {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.detail,
        )
    }
}

/// The session journal — records all operations in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
    pub session_id: String,
    pub session_start: DateTime<Local>,
    pub software_version: String,
    /// Ordered list of operations
    pub entries: Vec<LogEntry>,
}

impl SessionLog {
    /// Create a new empty journal
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            session_start: Local::now(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            entries: Vec::new(),
        }
    }

    /// Append an operation to the journal
    pub fn add_entry(&mut self, operation: &str, detail: &str) {
        let seq = self.entries.len() + 1;
        self.entries.push(LogEntry {
            sequence: seq,
            timestamp: Local::now(),
            operation: operation.to_string(),
            detail: detail.to_string(),
        });
        log::debug!("[journal {:03}] {} — {}", seq, operation, detail);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export as human-readable text
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══════════════════════════════════════════════════\n");
        out.push_str("  Spectrum Editing Session Journal\n");
        out.push_str("═══════════════════════════════════════════════════\n");
        out.push_str(&format!("  Session ID:  {}\n", self.session_id));
        out.push_str(&format!(
            "  Started:     {}\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("  Software:    spectra-engine v{}\n", self.software_version));
        out.push_str(&format!("  Operations:  {}\n", self.entries.len()));
        out.push_str("───────────────────────────────────────────────────\n");
        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push('\n');
        }
        out
    }

    /// Export as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_creation_and_entries() {
        let mut log = SessionLog::new();
        assert!(log.is_empty());

        log.add_entry("Smooth", "2 curve(s)");
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries[0].sequence, 1);
        assert_eq!(log.entries[0].operation, "Smooth");

        log.add_entry("Undo", "Smooth");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries[1].sequence, 2);
    }

    #[test]
    fn test_text_export() {
        let mut log = SessionLog::new();
        log.add_entry("Baseline", "1 curve(s)");
        let text = log.to_text();
        assert!(text.contains("Baseline"));
        assert!(text.contains("1 curve(s)"));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut log = SessionLog::new();
        log.add_entry("Peaks", "sample_a: 4 peaks");
        let json = log.to_json();
        let parsed: SessionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.session_id, log.session_id);
    }
}
