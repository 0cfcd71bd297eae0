use std::fmt;

#[cfg(feature = "colorized_output")]
use console::{style, Emoji};

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Check passed, with something the user should know
    Warning(String),
    /// Check failed; the conversion would abort here
    Failed(String),
}

impl CheckStatus {
    fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "✓",
            CheckStatus::Warning(_) => "⚠",
            CheckStatus::Failed(_) => "✗",
        }
    }
}

/// A named check and its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationCheck {
    /// What was checked
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
}

impl ValidationCheck {
    /// Passing check
    pub fn ok(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
        }
    }

    /// Passing check with a warning
    pub fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
        }
    }

    /// Failed check
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed(message.into()),
        }
    }
}

/// Ordered outcomes of a dry run over one conversion job
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// Raw file the job converts
    pub file_path: String,
}

impl ValidationReport {
    /// Empty report for `file_path`
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            file_path: file_path.into(),
        }
    }

    /// Append a check
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    fn count(&self, pred: impl Fn(&CheckStatus) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.status)).count()
    }

    /// Number of passing checks
    pub fn success_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Ok))
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Warning(_)))
    }

    /// Number of failures
    pub fn failure_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Failed(_)))
    }

    /// True if any check failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// True if any check warned
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    fn verdict(&self) -> &'static str {
        if self.has_failures() {
            "Check FAILED"
        } else if self.has_warnings() {
            "Check PASSED with warnings"
        } else {
            "Check PASSED"
        }
    }

    /// Report with terminal colours when the `colorized_output` feature is
    /// enabled, plain text otherwise
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use std::fmt::Write as _;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut out = String::new();
            let _ = writeln!(out, "{}", style("echocal Job Check").bold().cyan());
            let _ = writeln!(out, "{}: {}\n", style("File").bold(), self.file_path);

            for check in &self.checks {
                let _ = match &check.status {
                    CheckStatus::Ok => writeln!(out, "[{}] {}", OK, style(&check.name).green()),
                    CheckStatus::Warning(msg) => writeln!(
                        out,
                        "[{}] {} - {}",
                        WARN,
                        style(&check.name).yellow(),
                        msg
                    ),
                    CheckStatus::Failed(msg) => writeln!(
                        out,
                        "[{}] {} - {}",
                        FAIL,
                        style(&check.name).red(),
                        style(msg).red().bold()
                    ),
                };
            }

            let _ = writeln!(
                out,
                "\n{}: {} passed, {} warnings, {} failed",
                style("Summary").bold(),
                style(self.success_count()).green(),
                style(self.warning_count()).yellow(),
                style(self.failure_count()).red()
            );
            let verdict = if self.has_failures() {
                style(self.verdict()).red().bold()
            } else if self.has_warnings() {
                style(self.verdict()).yellow().bold()
            } else {
                style(self.verdict()).green().bold()
            };
            let _ = writeln!(out, "{verdict}");
            out
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "echocal Job Check")?;
        writeln!(f, "File: {}", self.file_path)?;
        writeln!(f)?;

        for check in &self.checks {
            write!(f, "[{}] {}", check.status.symbol(), check.name)?;
            match &check.status {
                CheckStatus::Ok => writeln!(f)?,
                CheckStatus::Warning(msg) => writeln!(f, " - WARNING: {msg}")?,
                CheckStatus::Failed(msg) => writeln!(f, " - FAILED: {msg}")?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} passed, {} warnings, {} failed",
            self.success_count(),
            self.warning_count(),
            self.failure_count()
        )?;
        writeln!(f, "{}", self.verdict())
    }
}
