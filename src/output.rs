//! CLI output formatting for `render`, `check`, and the seed commands.
//!
//! # Information-First Display
//!
//! Every line leads with what the entity *is* (page title, table name,
//! ministry name) and shows file paths and record ids as secondary context.
//! Entities are numbered with a 3-digit positional index, and detail lines
//! are indented four spaces under their entity.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! 001 Home → index.html
//! 002 About → about/index.html
//!     Content: fallback (store not configured)
//! 004 Ministries → ministries/index.html
//!     Content: live
//!     001 mens-ministry → ministries/mens-ministry/index.html
//!
//! Assets
//!     404.html
//!     static/style.css
//!
//! Rendered 8 pages, 7 ministry pages, 4 assets
//! ```
//!
//! ## Check
//!
//! ```text
//! Config
//!     site.toml
//! Store
//!     base appXXXXXXXX
//! Content
//!     Leadership: 10 records, live
//!     Sermons: 0 records, fallback (table empty)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::render::{ContentStatus, RenderReport};
use crate::seed::SeedOutcome;
use crate::store::client::BaseInfo;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Render
// ============================================================================

/// Format the static export report.
///
/// Ministry detail pages are listed under the ministries page with their own
/// numbering, in the order they were rendered.
pub fn format_render_output(report: &RenderReport) -> Vec<String> {
    let mut lines = Vec::new();
    let mut top = 0;
    let mut details = 0;

    for page in &report.pages {
        if let Some(slug) = page.path.strip_prefix("/ministries/") {
            details += 1;
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(details),
                slug,
                page.file
            ));
            continue;
        }
        top += 1;
        let title = match page.path.as_str() {
            "/" => "Home".to_string(),
            path => title_from_path(path),
        };
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(top),
            title,
            page.file
        ));
        if let Some(source) = &page.source {
            lines.push(format!("{}Content: {}", indent(1), source));
        }
    }

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("{}{}", indent(1), asset));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Rendered {}, {}, {}",
        plural(top, "page", "pages"),
        plural(details, "ministry page", "ministry pages"),
        plural(report.assets.len(), "asset", "assets"),
    ));
    lines
}

/// `/about` → `About`
fn title_from_path(path: &str) -> String {
    let word = path.trim_start_matches('/');
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn print_render_output(report: &RenderReport) {
    for line in format_render_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// What `check` found out about the environment.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// `None` when running on stock defaults.
    pub config_file: Option<String>,
    /// Base id when credentials are set, otherwise why they are not.
    pub store: Result<String, String>,
    pub content: Vec<ContentStatus>,
}

pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = vec!["Config".to_string()];
    match &report.config_file {
        Some(path) => lines.push(format!("{}{}", indent(1), path)),
        None => lines.push(format!("{}stock defaults", indent(1))),
    }

    lines.push("Store".to_string());
    match &report.store {
        Ok(base) => lines.push(format!("{}base {}", indent(1), base)),
        Err(reason) => lines.push(format!("{}not configured: {}", indent(1), reason)),
    }

    lines.push("Content".to_string());
    for status in &report.content {
        lines.push(format!(
            "{}{}: {}, {}",
            indent(1),
            status.table,
            plural(status.count, "record", "records"),
            status.source
        ));
    }
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Seed
// ============================================================================

/// Format one seed command's outcome.
///
/// ```text
/// Leadership
///     001 Pastor Doug Reeder
///     002 Joe Burke
///     Failed: Ed Harris
///         failed to write record to Leadership: ...
/// Wrote 2, failed 1
/// ```
pub fn format_seed_outcome(title: &str, outcome: &SeedOutcome) -> Vec<String> {
    let heading = match outcome.table {
        Some(table) => format!("{title} \u{2192} {table}"),
        None => title.to_string(),
    };
    let mut lines = vec![heading];
    for (i, label) in outcome.written.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), label));
    }
    for (label, reason) in &outcome.skipped {
        lines.push(format!("{}Skipped: {} ({})", indent(1), label, reason));
    }
    for (label, error) in &outcome.failed {
        lines.push(format!("{}Failed: {}", indent(1), label));
        lines.push(format!("{}{}", indent(2), error));
    }

    let mut summary = format!("Wrote {}", outcome.written.len());
    if !outcome.skipped.is_empty() {
        summary.push_str(&format!(", skipped {}", outcome.skipped.len()));
    }
    if !outcome.failed.is_empty() {
        summary.push_str(&format!(", failed {}", outcome.failed.len()));
    }
    lines.push(summary);
    lines
}

pub fn print_seed_outcome(title: &str, outcome: &SeedOutcome) {
    for line in format_seed_outcome(title, outcome) {
        println!("{}", line);
    }
}

pub fn format_bases(bases: &[BaseInfo]) -> Vec<String> {
    let mut lines = vec!["Bases".to_string()];
    for (i, base) in bases.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), base.name));
        lines.push(format!("{}Id: {}", indent(1), base.id));
        if !base.permission_level.is_empty() {
            lines.push(format!("{}Permission: {}", indent(1), base.permission_level));
        }
    }
    if bases.is_empty() {
        lines.push(format!("{}(none visible to this token)", indent(1)));
    }
    lines
}

pub fn print_bases(bases: &[BaseInfo]) {
    for line in format_bases(bases) {
        println!("{}", line);
    }
}
