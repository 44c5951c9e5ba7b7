// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    Note,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticLevel::Note => "NOTE",
            DiagnosticLevel::Warning => "WARNING",
            DiagnosticLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// A message recorded during a run, attributed to the step that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    level: DiagnosticLevel,
    step_id: String,
    location: Option<String>,
    message: String,
}

impl Diagnostic {
    pub(crate) fn new(
        level: DiagnosticLevel,
        step_id: impl Into<String>,
        location: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            step_id: step_id.into(),
            location,
            message: message.into(),
        }
    }

    pub fn level(&self) -> DiagnosticLevel {
        self.level
    }

    pub fn step_id(&self) -> &str {
        &self.step_id
    }

    /// Free-form location supplied by the step, e.g. a source file position.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.step_id)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_location() {
        let diagnostic = Diagnostic::new(
            DiagnosticLevel::Warning,
            "compile",
            Some("src/lib.rs:12".to_string()),
            "unused import",
        );
        assert_eq!(
            diagnostic.to_string(),
            "[WARNING] compile at src/lib.rs:12: unused import"
        );
    }

    #[test]
    fn test_display_without_location() {
        let diagnostic = Diagnostic::new(DiagnosticLevel::Error, "link", None, "missing symbol");
        assert_eq!(diagnostic.to_string(), "[ERROR] link: missing symbol");
        assert!(diagnostic.is_error());
    }

    #[test]
    fn test_levels_order_by_severity() {
        assert!(DiagnosticLevel::Note < DiagnosticLevel::Warning);
        assert!(DiagnosticLevel::Warning < DiagnosticLevel::Error);
    }
}
