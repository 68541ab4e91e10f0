//! Running package pipelines
//!
//! Each package goes through resolve, install and build in order. Packages
//! do not depend on each other, so up to `jobs` pipelines run at once on
//! scoped threads. A failing package is reported and the others carry on.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tracing::{debug, error};

use crate::error::{self, Result};
use crate::git::CheckoutOutcome;
use crate::package::{Package, StepOutcome, SyncContext};

/// What one successful pipeline did
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub kind: &'static str,
    pub checkout: Option<CheckoutOutcome>,
    pub install: StepOutcome,
    pub build: StepOutcome,
}

/// Outcome of one package's pipeline
#[derive(Debug)]
pub struct PackageReport {
    pub name: String,
    pub result: Result<PipelineSummary>,
}

impl PackageReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Resolve, install and build one package
pub fn run_pipeline(name: &str, ctx: &SyncContext<'_>) -> Result<PipelineSummary> {
    let package = Package::resolve(name, ctx)?;
    let install = package.install()?;
    let build = package.build()?;
    debug!(package = name, %install, %build, "pipeline finished");
    Ok(PipelineSummary {
        kind: package.kind(),
        checkout: package.checkout().cloned(),
        install,
        build,
    })
}

/// Names to sync: the requested ones without repeats, or every configured package
pub fn select_packages(ctx: &SyncContext<'_>, requested: &[String]) -> Vec<String> {
    let mut names: Vec<String> = if requested.is_empty() {
        ctx.config.packages.iter().map(|p| p.name.clone()).collect()
    } else {
        requested.to_vec()
    };
    let mut seen = std::collections::HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
    names
}

/// Run the pipelines of `names`, at most `jobs` at a time.
///
/// `on_finished` is called from the worker thread as each package
/// completes. Reports are returned in the order of `names`.
pub fn run(
    ctx: &SyncContext<'_>,
    names: &[String],
    jobs: usize,
    on_finished: impl Fn(&PackageReport) + Sync,
) -> Vec<PackageReport> {
    let workers = jobs.clamp(1, names.len().max(1));
    let next = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<PackageReport>>> =
        Mutex::new(names.iter().map(|_| None).collect());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(name) = names.get(index) else {
                        break;
                    };
                    let result = run_pipeline(name, ctx);
                    if let Err(e) = &result {
                        error!(package = %name, error = %e, "sync failed");
                    }
                    let report = PackageReport {
                        name: name.clone(),
                        result,
                    };
                    on_finished(&report);
                    slots.lock().unwrap_or_else(|e| e.into_inner())[index] = Some(report);
                }
            });
        }
    });

    slots
        .into_inner()
        .unwrap_or_else(|e| e.into_inner())
        .into_iter()
        .zip(names)
        .map(|(slot, name)| {
            slot.unwrap_or_else(|| PackageReport {
                name: name.clone(),
                result: Err(error::fs::io_error(format!(
                    "pipeline for '{name}' did not finish"
                ))),
            })
        })
        .collect()
}
