//! End-of-batch summary printed to stdout.

use std::fmt::Write as _;
use std::path::Path;
use ypd_core::retry::BatchReport;

pub fn print_report(report: &BatchReport, output_dir: &Path) {
    print!("{}", render_report(report, output_dir));
}

pub fn render_report(report: &BatchReport, output_dir: &Path) -> String {
    let mut out = String::new();
    for r in &report.rounds {
        let _ = writeln!(
            out,
            "Round {}: {} attempted, {} succeeded, {} failed",
            r.round, r.attempted, r.succeeded, r.failed
        );
    }
    let _ = writeln!(
        out,
        "Downloaded {}/{} into {}",
        report.succeeded.len(),
        report.total(),
        output_dir.display()
    );
    if !report.failed.is_empty() {
        let _ = writeln!(out, "Failed after {} round(s):", report.rounds.len());
        for job in &report.failed {
            let _ = writeln!(out, "  {} ({})", job.requested_name(), job.source_url());
        }
    }
    out
}
