// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies a chain of migrations to one document.
//!
//! ```text
//! Start ─┬─ from == to ──────────────→ Success (no steps)
//!        ├─ from > to ───────────────→ Failure (invalid range)
//!        ├─ strict && gaps ──────────→ Failure (missing migrations)
//!        └─ walk chain ─┬─ all ok ───→ Success
//!                       ├─ mismatch ─→ Failure (at last reached version)
//!                       └─ step err ─→ Failure (at last reached version)
//! ```
//!
//! The executor is configured once through [`ExecutorBuilder`] and holds no
//! per-run state, so a single instance may serve many runs.

use crate::result::ResultRecorder;
use crate::{
    Document, Migration, MigrationContext, MigrationError, MigrationRegistry, MigrationResult,
    MigrationStep, StepError,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Execution policy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorOptions {
    /// Require a registered migration for every version in the range and
    /// check each step's declared source version against the version
    /// actually reached.
    pub strict: bool,
    /// Run against a copy; the caller's document is left untouched.
    pub dry_run: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            strict: true,
            dry_run: false,
        }
    }
}

type BeforeHook = Box<dyn Fn(&dyn Migration) + Send + Sync>;
type AfterHook = Box<dyn Fn(&dyn Migration, &MigrationContext<'_>) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&MigrationError) + Send + Sync>;

/// Optional lifecycle callbacks. A panicking callback is logged and
/// otherwise ignored; it never changes the outcome of a run.
#[derive(Default)]
struct Hooks {
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
    on_error: Option<ErrorHook>,
}

/// Builder for [`MigrationExecutor`].
pub struct ExecutorBuilder {
    registry: Arc<MigrationRegistry>,
    options: ExecutorOptions,
    hooks: Hooks,
}

impl ExecutorBuilder {
    pub fn options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    /// Called before each step's body runs.
    pub fn before_migration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Migration) + Send + Sync + 'static,
    {
        self.hooks.before = Some(Box::new(hook));
        self
    }

    /// Called after each step completes and its version is stamped.
    pub fn after_migration<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Migration, &MigrationContext<'_>) + Send + Sync + 'static,
    {
        self.hooks.after = Some(Box::new(hook));
        self
    }

    /// Called when a step fails or the chain is malformed.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&MigrationError) + Send + Sync + 'static,
    {
        self.hooks.on_error = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> MigrationExecutor {
        MigrationExecutor {
            registry: self.registry,
            options: self.options,
            hooks: self.hooks,
        }
    }
}

/// Walks a version range and applies the registered migrations in order.
pub struct MigrationExecutor {
    registry: Arc<MigrationRegistry>,
    options: ExecutorOptions,
    hooks: Hooks,
}

impl MigrationExecutor {
    /// Executor with default options (strict, not dry-run) and no hooks.
    pub fn new(registry: Arc<MigrationRegistry>) -> Self {
        Self::builder(registry).build()
    }

    pub fn builder(registry: Arc<MigrationRegistry>) -> ExecutorBuilder {
        ExecutorBuilder {
            registry,
            options: ExecutorOptions::default(),
            hooks: Hooks::default(),
        }
    }

    pub fn registry(&self) -> &Arc<MigrationRegistry> {
        &self.registry
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    /// Migrate an in-memory document from `from` to `to`.
    ///
    /// Unless dry-run is enabled the document is modified in place; the
    /// result carries a copy of the document as the run left it.
    pub fn execute(&self, document: &mut Document, from: u32, to: u32) -> MigrationResult {
        self.run(None, document, from, to)
    }

    /// Like [`execute`](Self::execute), for a document loaded from `path`.
    pub fn execute_at(
        &self,
        path: &Path,
        document: &mut Document,
        from: u32,
        to: u32,
    ) -> MigrationResult {
        self.run(Some(path), document, from, to)
    }

    /// Preflight: true if a run from `from` to `to` has no gaps.
    pub fn can_migrate(&self, from: u32, to: u32) -> bool {
        from == to || (from < to && self.registry.has_complete_migration_chain(from, to))
    }

    fn run(
        &self,
        path: Option<&Path>,
        document: &mut Document,
        from: u32,
        to: u32,
    ) -> MigrationResult {
        if from == to {
            return MigrationResult::no_migration_needed(from, document.clone());
        }

        let chain = match self.registry.migrations_in_range(from, to) {
            Ok(chain) => chain,
            Err(error) => {
                warn!(from, to, error = %error, "rejected migration run");
                return MigrationResult::rejected(from, document.clone(), error);
            }
        };

        if self.options.strict {
            let missing = self.registry.find_missing_migrations(from, to);
            if !missing.is_empty() {
                let error = MigrationError::MissingMigrations(missing);
                warn!(from, to, error = %error, "rejected migration run");
                return MigrationResult::rejected(from, document.clone(), error);
            }
        }

        let mut scratch;
        let working: &mut Document = if self.options.dry_run {
            scratch = document.clone();
            &mut scratch
        } else {
            document
        };

        let mut recorder = ResultRecorder::start(from);
        let mut current = from;

        for migration in &chain {
            let migration = migration.as_ref();
            let target = migration.target_version();

            if self.options.strict && migration.source_version() != current {
                let error = MigrationError::VersionMismatch {
                    expected: current,
                    declared: migration.source_version(),
                    target,
                };
                warn!(from, reached = current, error = %error, "malformed migration chain");
                self.notify_error(&error);
                return recorder.fail(current, working.clone(), error);
            }

            self.notify_before(migration);

            let mut ctx = MigrationContext::new(path, &mut *working, current, to);
            let started = Instant::now();
            match invoke(migration, &mut ctx) {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    ctx.document_mut().set_version(target);
                    debug!(
                        from = current,
                        to = target,
                        elapsed_us = elapsed.as_micros() as u64,
                        "applied migration: {}",
                        migration.description()
                    );
                    recorder.record(MigrationStep::from_migration(migration, elapsed));
                    self.notify_after(migration, &ctx);
                    current = target;
                }
                Err(err) => {
                    drop(ctx);
                    let error = MigrationError::from_step(target, err);
                    warn!(from, reached = current, version = target, error = %error, "migration step failed");
                    self.notify_error(&error);
                    return recorder.fail(current, working.clone(), error);
                }
            }
        }

        let reached = if self.options.dry_run { to } else { current };
        let result = recorder.succeed(reached, working.clone());
        info!(
            from,
            to = reached,
            steps = result.steps().len(),
            dry_run = self.options.dry_run,
            "migration complete"
        );
        result
    }

    fn notify_before(&self, migration: &dyn Migration) {
        if let Some(hook) = &self.hooks.before {
            guard_hook("before_migration", || hook(migration));
        }
    }

    fn notify_after(&self, migration: &dyn Migration, ctx: &MigrationContext<'_>) {
        if let Some(hook) = &self.hooks.after {
            guard_hook("after_migration", || hook(migration, ctx));
        }
    }

    fn notify_error(&self, error: &MigrationError) {
        if let Some(hook) = &self.hooks.on_error {
            guard_hook("on_error", || hook(error));
        }
    }
}

#[derive(Debug, Error)]
#[error("migration panicked: {0}")]
struct StepPanicked(String);

/// Run a migration body, turning a panic into a step error.
fn invoke(migration: &dyn Migration, ctx: &mut MigrationContext<'_>) -> Result<(), StepError> {
    match panic::catch_unwind(AssertUnwindSafe(|| migration.migrate(ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(Box::new(StepPanicked(panic_message(payload.as_ref())))),
    }
}

fn guard_hook(name: &str, hook: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(hook)) {
        warn!(hook = name, panic = %panic_message(payload.as_ref()), "migration callback panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
