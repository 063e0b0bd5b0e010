//! Error types, failure causes and property outcomes.

use crate::data::Seed;
use crate::shrinking::ShrinkingState;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Main error type for Porcupine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PorcupineError {
    /// A filter rejected too many consecutive values.
    #[error("Filter missed {misses} times in a row")]
    TooManyFilterMisses { misses: usize },

    /// A uniqueness constraint produced too many consecutive duplicates.
    #[error("Uniqueness constraint missed {misses} times in a row")]
    TooManyUniqueMisses { misses: usize },

    /// Ignored generation failures kept recurring.
    #[error("Ignored generation failure '{name}' recurred {misses} times in a row")]
    TooManyIgnoredFailures { name: String, misses: usize },

    /// A range or target that cannot be satisfied.
    #[error("Invalid range: {message}")]
    InvalidRange { message: String },

    /// Invalid generator construction.
    #[error("Invalid generator: {message}")]
    InvalidGenerator { message: String },

    /// User code failed while a value was being generated.
    #[error("Generation failed: {0}")]
    Generation(Failure),
}

impl PorcupineError {
    /// Configuration errors are fatal and never retried.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, PorcupineError::Generation(_))
    }

    pub(crate) fn invalid_range(message: impl Into<String>) -> Self {
        PorcupineError::InvalidRange {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_generator(message: impl Into<String>) -> Self {
        PorcupineError::InvalidGenerator {
            message: message.into(),
        }
    }
}

/// Result type for Porcupine operations.
pub type Result<T> = std::result::Result<T, PorcupineError>;

/// Source location a failure was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl Origin {
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Origin {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// What kind of failure happened and where.
///
/// Two failures are the same failure exactly when their kinds compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FailureKind {
    pub name: Cow<'static, str>,
    pub origin: Option<Origin>,
}

impl FailureKind {
    pub fn new(name: impl Into<Cow<'static, str>>, origin: Option<Origin>) -> Self {
        FailureKind {
            name: name.into(),
            origin,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{} at {}", self.name, origin),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The cause attached to a falsified trial or a failed generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    /// Create a failure whose origin is the caller's location.
    #[track_caller]
    pub fn new(name: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Failure {
            kind: FailureKind::new(name, Some(Origin::caller())),
            message: message.into(),
        }
    }

    /// Create a failure without an origin.
    pub fn unlocated(name: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Failure {
            kind: FailureKind::new(name, None),
            message: message.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.kind.name
    }

    /// Whether both failures have the same kind raised from the same place.
    pub fn same_failure(&self, other: &Failure) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

/// A shrinking step in the failure progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkStep {
    /// The step number (0 = original, 1+ = accepted improvements).
    pub step: usize,
    /// The parameter values at this step, rendered with `Debug`.
    pub sample: Vec<String>,
}

/// Outcome of a property check.
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    /// Every trial was satisfied.
    Pass { tests_run: usize, edge_cases_run: usize },

    /// Every value of a finite parameter space was checked.
    Exhausted { tests_run: usize },

    /// A trial falsified the property.
    Fail {
        /// The sample that first failed.
        original: Vec<String>,
        /// The sample after shrinking.
        minimal: Vec<String>,
        /// The cause reported by the minimal sample.
        cause: Option<Failure>,
        /// Seed of the run, when the failing sample was randomly generated.
        seed: Option<Seed>,
        tests_run: usize,
        shrinks_performed: usize,
        shrinking: ShrinkingState,
        /// The shrinking progression showing how we reached the minimal counterexample.
        shrink_steps: Vec<ShrinkStep>,
    },

    /// Too many test cases were discarded.
    Discard { limit: usize, tests_run: usize },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. } | TestResult::Exhausted { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Pass {
                tests_run,
                edge_cases_run,
            } => write!(
                f,
                "  ✓ property passed {} tests ({} edge cases).",
                tests_run, edge_cases_run
            ),
            TestResult::Exhausted { tests_run } => write!(
                f,
                "  ✓ property passed all {} values of its space.",
                tests_run
            ),
            TestResult::Fail {
                original,
                minimal,
                cause,
                seed,
                tests_run,
                shrinks_performed,
                shrink_steps,
                ..
            } => {
                writeln!(
                    f,
                    "  ✗ property failed after {} tests and {} shrinks.",
                    tests_run, shrinks_performed
                )?;
                if let Some(seed) = seed {
                    writeln!(f, "    {}", seed)?;
                }
                writeln!(f, "    Original sample: [{}]", original.join(", "))?;

                if shrink_steps.len() > 1 {
                    writeln!(f)?;
                    writeln!(f, "    Shrinking progression:")?;
                    for step in shrink_steps {
                        writeln!(f, "      │ Step {}: [{}]", step.step, step.sample.join(", "))?;
                    }
                    writeln!(f)?;
                }

                if let Some(cause) = cause {
                    writeln!(f, "    === {} ===", cause)?;
                }

                write!(f, "    Minimal counterexample: [{}]", minimal.join(", "))
            }
            TestResult::Discard { limit, tests_run } => write!(
                f,
                "  ⚐ property gave up after {} discards ({} tests run)",
                limit, tests_run
            ),
        }
    }
}
