//! Progress display for sync runs

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::package::StepOutcome;
use crate::sync::{PackageReport, PipelineSummary};

/// One bar over all packages of a run, with a line per finished package
pub struct SyncProgress {
    bar: ProgressBar,
}

impl SyncProgress {
    /// Create a progress display for `total` packages
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "]);

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    /// Print the outcome line for a package and advance the bar
    pub fn finish_package(&self, report: &PackageReport) {
        let line = describe(report);
        // the bar draws nothing when stderr is not a terminal
        if self.bar.is_hidden() {
            println!("{line}");
        } else {
            self.bar.println(line);
        }
        self.bar.set_message(report.name.clone());
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn describe(report: &PackageReport) -> String {
    let name = Style::new().bold().apply_to(&report.name);
    match &report.result {
        Ok(summary) => format!(
            "  {} {} {}",
            Style::new().green().apply_to("✓"),
            name,
            Style::new().dim().apply_to(steps(summary))
        ),
        Err(e) => format!("  {} {} {}", Style::new().red().apply_to("✗"), name, e),
    }
}

fn steps(summary: &PipelineSummary) -> String {
    let mut parts = Vec::new();
    if let Some(checkout) = &summary.checkout {
        let short = checkout.commit.get(..7).unwrap_or(&checkout.commit);
        let verb = if checkout.cloned { "cloned" } else { "checked out" };
        parts.push(format!("{verb} {} at {short}", checkout.binding.git_ref()));
        if checkout.remote_added {
            parts.push(format!("added remote {}", checkout.binding.remote_name));
        }
    }
    parts.push(format!("install {}", step(summary.install)));
    parts.push(format!("build {}", step(summary.build)));
    format!("({}, {})", summary.kind, parts.join(", "))
}

fn step(outcome: StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Ran => "done",
        StepOutcome::Skipped => "up to date",
    }
}
