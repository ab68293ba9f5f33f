//! Diagnostic formatting for CLI output
//!
//! Rejected input rows are reported through one of two emitters:
//! - `TerminalEmitter`: rustc-style text, written to stderr
//! - `JsonEmitter`: machine-readable JSON
//!
//! Both emitters support:
//! - `--strict` mode: rejected rows count as errors instead of warnings
//! - `--quiet` mode: suppresses everything except errors
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: chart produced, rejected rows (if any) were warnings |
//! | 1 | Failure: nothing usable, or a rejected row under `--strict` |
//!
//! `--quiet` and `--format=json` never change the exit code.

use std::io::Write;
use std::process;

use serde::Serialize;
use timeline_core::{RowFailure, RowIndex};

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: no errors (warnings allowed)
    Success = 0,
    /// Failure: one or more errors emitted
    Failure = 1,
}

impl ExitCode {
    /// Determine exit code from error count.
    ///
    /// The count should already reflect strict-mode escalation.
    pub fn from_error_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single reportable problem with the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Zero-based data row, if the problem belongs to one row
    pub row: Option<RowIndex>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// A rejected row; the run continues without it
    pub fn rejected_row(failure: &RowFailure) -> Self {
        Self {
            code: failure.error.code(),
            severity: Severity::Warning,
            message: failure.error.to_string(),
            row: Some(failure.row),
            notes: vec![format!("row {} left out of the chart", failure.row)],
        }
    }

    /// Nothing in the input could be charted
    pub fn no_valid_data(total_rows: usize) -> Self {
        Self {
            code: "E000",
            severity: Severity::Error,
            message: format!("no usable rows among {total_rows} input rows"),
            row: None,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Receives diagnostics
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: Diagnostic);
}

// ============================================================================
// Diagnostic Config
// ============================================================================

/// Configuration for diagnostic output
#[derive(Debug, Clone, Default)]
pub struct DiagnosticConfig {
    /// Rejected rows become errors
    pub strict: bool,
    /// Suppress all output except errors
    pub quiet: bool,
    /// Input file shown in `-->` lines
    pub file: Option<String>,
}

impl DiagnosticConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Default::default()
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Escalate severity according to strict mode
    pub fn effective_severity(&self, severity: Severity) -> Severity {
        if self.strict {
            Severity::Error
        } else {
            severity
        }
    }

    /// Check if a diagnostic should be shown based on quiet mode
    pub fn should_show(&self, severity: Severity) -> bool {
        !self.quiet || self.effective_severity(severity) == Severity::Error
    }
}

// ============================================================================
// Terminal Emitter
// ============================================================================

/// Terminal emitter that writes rustc-style diagnostics
pub struct TerminalEmitter<W: Write> {
    writer: W,
    config: DiagnosticConfig,
    error_count: usize,
    warning_count: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, config: DiagnosticConfig) -> Self {
        Self {
            writer,
            config,
            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Exit code based on emitted diagnostics (after policy)
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> std::io::Result<()> {
        let severity = self.config.effective_severity(diagnostic.severity);

        // Counted even when hidden: quiet must not change the exit code
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }

        if !self.config.should_show(diagnostic.severity) {
            return Ok(());
        }

        writeln!(
            self.writer,
            "{}[{}]: {}",
            severity.as_str(),
            diagnostic.code,
            diagnostic.message
        )?;

        if let Some(file) = &self.config.file {
            match diagnostic.row {
                Some(row) => writeln!(self.writer, "  --> {file}: row {row}")?,
                None => writeln!(self.writer, "  --> {file}")?,
            }
        }

        if !diagnostic.notes.is_empty() {
            writeln!(self.writer, "   |")?;
            for note in &diagnostic.notes {
                writeln!(self.writer, "   = {note}")?;
            }
        }

        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        // stderr may be closed
        let _ = self.write_diagnostic(&diagnostic);
    }
}

// ============================================================================
// JSON Emitter
// ============================================================================

/// JSON emitter that collects diagnostics for a single report
pub struct JsonEmitter {
    diagnostics: Vec<JsonDiagnostic>,
    config: DiagnosticConfig,
    error_count: usize,
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<RowIndex>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl JsonEmitter {
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            diagnostics: Vec::new(),
            config,
            error_count: 0,
        }
    }

    pub fn diagnostics(&self) -> &[JsonDiagnostic] {
        &self.diagnostics
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    /// Take the collected diagnostics for embedding in a report
    pub fn into_diagnostics(self) -> Vec<JsonDiagnostic> {
        self.diagnostics
    }
}

impl DiagnosticEmitter for JsonEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let severity = self.config.effective_severity(diagnostic.severity);
        if severity == Severity::Error {
            self.error_count += 1;
        }

        if !self.config.should_show(diagnostic.severity) {
            return;
        }

        self.diagnostics.push(JsonDiagnostic {
            code: diagnostic.code.to_string(),
            severity,
            message: diagnostic.message,
            file: self.config.file.clone(),
            row: diagnostic.row,
            notes: diagnostic.notes,
        });
    }
}
