// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome of one executor run.

use crate::{Document, Migration, MigrationError};
use std::fmt;
use std::time::{Duration, Instant};

/// Record of one completed migration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    pub from_version: u32,
    pub to_version: u32,
    pub description: String,
    pub duration: Duration,
}

impl MigrationStep {
    pub fn from_migration(migration: &dyn Migration, duration: Duration) -> Self {
        Self {
            from_version: migration.source_version(),
            to_version: migration.target_version(),
            description: migration.description(),
            duration,
        }
    }
}

/// What a run covered, shared by both outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// Version the document started at
    pub from_version: u32,
    /// Version reached; on failure, the last version successfully applied
    pub to_version: u32,
    /// Completed steps, in application order
    pub steps: Vec<MigrationStep>,
    /// Wall time of the whole run
    pub duration: Duration,
    /// Document as it stood when the run ended
    pub document: Document,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum MigrationResult {
    Success(MigrationReport),
    Failure {
        report: MigrationReport,
        error: MigrationError,
    },
}

impl MigrationResult {
    /// Successful run that had nothing to do.
    pub fn no_migration_needed(version: u32, document: Document) -> Self {
        MigrationResult::Success(MigrationReport {
            from_version: version,
            to_version: version,
            steps: Vec::new(),
            duration: Duration::ZERO,
            document,
        })
    }

    /// Failure before any step ran.
    pub fn rejected(from_version: u32, document: Document, error: MigrationError) -> Self {
        MigrationResult::Failure {
            report: MigrationReport {
                from_version,
                to_version: from_version,
                steps: Vec::new(),
                duration: Duration::ZERO,
                document,
            },
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MigrationResult::Success(_))
    }

    /// Success with no steps and no version change.
    pub fn is_noop(&self) -> bool {
        match self {
            MigrationResult::Success(report) => {
                report.steps.is_empty() && report.from_version == report.to_version
            }
            MigrationResult::Failure { .. } => false,
        }
    }

    pub fn report(&self) -> &MigrationReport {
        match self {
            MigrationResult::Success(report) | MigrationResult::Failure { report, .. } => report,
        }
    }

    pub fn from_version(&self) -> u32 {
        self.report().from_version
    }

    pub fn to_version(&self) -> u32 {
        self.report().to_version
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.report().steps
    }

    pub fn duration(&self) -> Duration {
        self.report().duration
    }

    pub fn document(&self) -> &Document {
        &self.report().document
    }

    pub fn error(&self) -> Option<&MigrationError> {
        match self {
            MigrationResult::Success(_) => None,
            MigrationResult::Failure { error, .. } => Some(error),
        }
    }

    pub fn into_document(self) -> Document {
        match self {
            MigrationResult::Success(report) | MigrationResult::Failure { report, .. } => {
                report.document
            }
        }
    }

    pub fn into_error(self) -> Option<MigrationError> {
        match self {
            MigrationResult::Success(_) => None,
            MigrationResult::Failure { error, .. } => Some(error),
        }
    }

    /// Split into the report and, for failures, the error.
    pub fn into_parts(self) -> (MigrationReport, Option<MigrationError>) {
        match self {
            MigrationResult::Success(report) => (report, None),
            MigrationResult::Failure { report, error } => (report, Some(error)),
        }
    }
}

impl fmt::Display for MigrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report();
        match self {
            MigrationResult::Success(_) if self.is_noop() => {
                write!(f, "no migration needed (version {})", report.from_version)
            }
            MigrationResult::Success(_) => write!(
                f,
                "migrated v{}→v{} in {} step(s) ({:?})",
                report.from_version,
                report.to_version,
                report.steps.len(),
                report.duration
            ),
            MigrationResult::Failure { error, .. } => write!(
                f,
                "migration from v{} failed at v{} after {} step(s): {}",
                report.from_version,
                report.to_version,
                report.steps.len(),
                error
            ),
        }
    }
}

/// Accumulates steps while the executor walks a chain.
pub(crate) struct ResultRecorder {
    from_version: u32,
    started: Instant,
    steps: Vec<MigrationStep>,
}

impl ResultRecorder {
    pub(crate) fn start(from_version: u32) -> Self {
        Self {
            from_version,
            started: Instant::now(),
            steps: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, step: MigrationStep) {
        self.steps.push(step);
    }

    fn report(self, to_version: u32, document: Document) -> MigrationReport {
        MigrationReport {
            from_version: self.from_version,
            to_version,
            steps: self.steps,
            duration: self.started.elapsed(),
            document,
        }
    }

    pub(crate) fn succeed(self, to_version: u32, document: Document) -> MigrationResult {
        MigrationResult::Success(self.report(to_version, document))
    }

    pub(crate) fn fail(
        self,
        reached_version: u32,
        document: Document,
        error: MigrationError,
    ) -> MigrationResult {
        MigrationResult::Failure {
            report: self.report(reached_version, document),
            error,
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
