//! Conformance report types: results, severity levels, and report aggregation.

use std::fmt;

/// Severity level of a conformance check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The check passed.
    Pass,
    /// The check found something worth reporting that does not break a
    /// writer property (e.g. a fixture RDF/XML cannot express).
    Warning,
    /// The check failed.
    Failure,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Pass => "PASS",
            Severity::Warning => "WARN",
            Severity::Failure => "FAIL",
        })
    }
}

/// A single conformance check result.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Validator that produced this result (`determinism`, `roundtrip`, ...).
    pub validator: String,
    /// Fixture or corpus file the check ran on.
    pub fixture: String,
    /// Human-readable outcome.
    pub message: String,
    /// Severity of the result.
    pub severity: Severity,
    /// Additional detail lines, typically the first differing output lines.
    pub details: Vec<String>,
}

impl TestResult {
    fn new(
        validator: impl Into<String>,
        fixture: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            validator: validator.into(),
            fixture: fixture.into(),
            message: message.into(),
            severity,
            details: Vec::new(),
        }
    }

    /// Creates a passing result.
    pub fn pass(
        validator: impl Into<String>,
        fixture: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(validator, fixture, message, Severity::Pass)
    }

    /// Creates a failure result.
    pub fn fail(
        validator: impl Into<String>,
        fixture: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(validator, fixture, message, Severity::Failure)
    }

    /// Creates a warning result.
    pub fn warn(
        validator: impl Into<String>,
        fixture: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(validator, fixture, message, Severity::Warning)
    }

    /// Attaches detail lines.
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Returns true if this result represents a failure.
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.validator, self.fixture, self.message
        )?;
        for detail in &self.details {
            write!(f, "\n    {detail}")?;
        }
        Ok(())
    }
}

/// Aggregated results of a conformance run.
#[derive(Debug, Default)]
pub struct ConformanceReport {
    /// Every individual result, in the order the validators produced them.
    pub results: Vec<TestResult>,
}

impl ConformanceReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result.
    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Appends every result of `other`.
    pub fn extend(&mut self, other: ConformanceReport) {
        self.results.extend(other.results);
    }

    /// Number of failed checks.
    pub fn failure_count(&self) -> usize {
        self.count(Severity::Failure)
    }

    /// Number of warnings.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.results.iter().filter(|r| r.severity == severity).count()
    }

    /// Returns true if no check failed.
    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }

    /// One-line summary such as `42 checks: 40 passed, 2 warnings, 0 failures`.
    pub fn summary(&self) -> String {
        format!(
            "{} checks: {} passed, {} warnings, {} failures",
            self.results.len(),
            self.count(Severity::Pass),
            self.warning_count(),
            self.failure_count()
        )
    }
}
