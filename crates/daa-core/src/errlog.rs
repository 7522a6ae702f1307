//! Ring-bounded per-instance error and warning log.
//!
//! Invalid inputs never abort a computation: the offending call is rejected,
//! a message is recorded here, and state is left unchanged. The log keeps
//! the most recent entries up to a cap; older entries are evicted and the
//! drained message is prefixed with "[...]" to show truncation.

use std::collections::VecDeque;

const DEFAULT_LIMIT: usize = 25;

#[derive(Debug, Clone)]
pub struct ErrorLog {
    name: String,
    entries: VecDeque<String>,
    limit: usize,
    has_error: bool,
    truncated: bool,
}

impl ErrorLog {
    pub fn new(name: impl Into<String>) -> Self {
        ErrorLog {
            name: name.into(),
            entries: VecDeque::new(),
            limit: DEFAULT_LIMIT,
            has_error: false,
            truncated: false,
        }
    }

    pub fn set_size_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
    }

    fn push(&mut self, entry: String) {
        self.entries.push_back(entry);
        if self.entries.len() > self.limit {
            self.entries.pop_front();
            self.truncated = true;
        }
    }

    pub fn add_error(&mut self, msg: impl AsRef<str>) {
        self.has_error = true;
        tracing::warn!(component = %self.name, "{}", msg.as_ref());
        self.push(format!("ERROR in {}: {}", self.name, msg.as_ref()));
    }

    pub fn add_warning(&mut self, msg: impl AsRef<str>) {
        tracing::debug!(component = %self.name, "{}", msg.as_ref());
        self.push(format!("Warning in {}: {}", self.name, msg.as_ref()));
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn has_message(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Drain the log: returns the accumulated message and clears it.
    pub fn get_message(&mut self) -> String {
        let msg = self.get_message_no_clear();
        self.entries.clear();
        self.has_error = false;
        self.truncated = false;
        msg
    }

    pub fn get_message_no_clear(&self) -> String {
        let mut out = String::new();
        if self.truncated {
            out.push_str("[...] ");
        }
        for e in &self.entries {
            out.push_str(e);
            out.push('\n');
        }
        out
    }

    /// Validation guard: record an error unless `val > 0`.
    pub fn is_positive(&mut self, method: &str, val: f64) -> bool {
        if val > 0.0 {
            return true;
        }
        self.add_error(format!("[{method}] Value {val:.4} is non positive"));
        false
    }

    /// Validation guard: record an error unless `val >= 0`.
    pub fn is_non_negative(&mut self, method: &str, val: f64) -> bool {
        if val >= 0.0 {
            return true;
        }
        self.add_error(format!("[{method}] Value {val:.4} is negative"));
        false
    }

    /// Validation guard: record an error unless `val < bound`.
    pub fn is_less_than(&mut self, method: &str, val: f64, bound: f64) -> bool {
        if val < bound {
            return true;
        }
        self.add_error(format!("[{method}] Value {val:.4} is not less than {bound:.4}"));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_clears_the_log() {
        let mut log = ErrorLog::new("Test");
        log.add_error("boom");
        assert!(log.has_error());
        let msg = log.get_message();
        assert!(msg.contains("ERROR in Test: boom"));
        assert!(!log.has_error());
        assert!(!log.has_message());
    }

    #[test]
    fn eviction_marks_truncation() {
        let mut log = ErrorLog::new("Test");
        log.set_size_limit(3);
        for i in 0..5 {
            log.add_warning(format!("w{i}"));
        }
        let msg = log.get_message();
        assert!(msg.starts_with("[...] "));
        assert!(!msg.contains("w0"));
        assert!(msg.contains("w4"));
    }

    #[test]
    fn guards() {
        let mut log = ErrorLog::new("Test");
        assert!(log.is_positive("set", 1.0));
        assert!(!log.is_positive("set", 0.0));
        assert!(log.is_non_negative("set", 0.0));
        assert!(!log.is_non_negative("set", -1.0));
        assert!(log.has_error());
    }
}
