//! Human-readable rendering of sync outcomes.

use colored::{ColoredString, Colorize};

use super::types::{BatchResult, ItemKind, ItemReport, SyncOutcome};

/// Status marker for one outcome.
#[must_use]
pub fn marker(outcome: &SyncOutcome) -> ColoredString {
    match outcome {
        SyncOutcome::Created | SyncOutcome::Updated => "✓".green(),
        SyncOutcome::SkippedUnchanged => "·".dimmed(),
        SyncOutcome::SkippedVersionMismatch | SyncOutcome::SkippedUserDeclined => "⏭".yellow(),
        SyncOutcome::Error(_) => "✗".red(),
    }
}

/// One-line description of an item, without the marker.
#[must_use]
pub fn describe(item: &ItemReport) -> String {
    let kind = match item.kind {
        ItemKind::Project => "project",
        ItemKind::Flow => "flow",
    };
    let id = item
        .id
        .as_deref()
        .map(|id| format!(" ({id})"))
        .unwrap_or_default();
    format!("{} {kind} '{}'{id} → {}", item.outcome, item.name, item.path)
}

/// `N created, N updated, N skipped, N errors out of N`.
#[must_use]
pub fn summary_line(batch: &BatchResult) -> String {
    format!(
        "{} created, {} updated, {} skipped, {} errors out of {}",
        batch.created(),
        batch.updated(),
        batch.skipped(),
        batch.errors(),
        batch.total()
    )
}

/// Print one item with its warnings.
pub fn print_item(item: &ItemReport) {
    println!("  {} {}", marker(&item.outcome), describe(item));
    for warning in &item.warnings {
        println!("    {} {}", "!".yellow(), warning.yellow());
    }
}

/// Print a batch: the project entry, each flow, then the counts.
pub fn print_batch(title: &str, batch: &BatchResult) {
    println!("{}", title.bold().underline());
    println!();

    if let Some(project) = &batch.project {
        println!("{}", "Project:".blue().bold());
        print_item(project);
        println!();
    }

    if batch.items.is_empty() {
        println!("{}", "No flows found.".dimmed());
    } else {
        println!("{}", "Flows:".blue().bold());
        for item in &batch.items {
            print_item(item);
        }
    }
    println!();

    let summary = summary_line(batch);
    if batch.is_clean() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.red());
    }
}
