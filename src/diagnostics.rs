//! Soft-error and warning sink (spec §7).
//!
//! Fatal errors are `Result<_, PmwError>` and bubble with `?`. Everything
//! else — recoverable soft errors and warnings — is recorded here so the
//! pipeline can continue with the rest of the input, matching the
//! propagation policy: "errors during layout that name a specific item skip
//! that item but continue with the next."

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Soft,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub context: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{ctx}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Accumulates soft errors/warnings over one run. Never aborts on its own;
/// callers inspect [`Diagnostics::exit_code`] once the pipeline completes.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    fatal: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            context: None,
        });
        log::warn!("{}", self.entries.last().unwrap());
    }

    pub fn soft_error(&mut self, message: impl Into<String>, context: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Soft,
            message: message.into(),
            context: Some(context.into()),
        });
        log::error!("{}", self.entries.last().unwrap());
    }

    pub fn mark_fatal(&mut self) {
        self.fatal = true;
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn has_soft_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Soft)
    }

    /// 0 if clean, 1 if only soft errors/warnings were reported, >=2 if a
    /// fatal condition was flagged (spec §7 "User-visible behaviour").
    pub fn exit_code(&self) -> i32 {
        if self.fatal {
            2
        } else if self.has_soft_errors() {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_run_exits_zero() {
        let d = Diagnostics::new();
        assert_eq!(d.exit_code(), 0);
    }

    #[test]
    fn soft_error_exits_one() {
        let mut d = Diagnostics::new();
        d.soft_error("bad integer", "score.pmw:12");
        assert_eq!(d.exit_code(), 1);
    }

    #[test]
    fn fatal_exits_at_least_two() {
        let mut d = Diagnostics::new();
        d.soft_error("bad integer", "score.pmw:12");
        d.mark_fatal();
        assert_eq!(d.exit_code(), 2);
    }
}
