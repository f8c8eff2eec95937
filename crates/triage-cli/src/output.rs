//! Plain-text rendering of requests, classifications and summaries.
//!
//! Every function returns a `String`; `main.rs` decides where it goes.

use std::fmt::Write;

use triage_core::{AdvanceOutcome, Classification, LifecycleState, Priority, Request, RuleTable};

fn priority_marker(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!!!",
        Priority::Medium => "!! ",
        Priority::Low => "!  ",
    }
}

/// One-line summary used by `list`.
pub fn request_line(req: &Request) -> String {
    format!(
        "{} #{:<4} {:<11} {:<16} {}",
        priority_marker(req.priority()),
        req.id(),
        req.status(),
        req.department(),
        req.summary()
    )
}

/// Every field of a request, used by `show` and after `create`.
pub fn request_detail(req: &Request) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Request #{}", req.id());
    let _ = writeln!(out, "  Summary:     {}", req.summary());
    let _ = writeln!(out, "  Description: {}", req.description());
    let _ = writeln!(out, "  Channel:     {}", req.channel());
    let _ = writeln!(out, "  Requester:   {}", req.requester_type());
    let _ = writeln!(out, "  Priority:    {}", req.priority());
    let _ = writeln!(out, "  Department:  {}", req.department());
    let _ = writeln!(out, "  Category:    {}", req.category());
    let _ = writeln!(out, "  Status:      {}", req.status());
    let _ = writeln!(out, "  Created:     {}", req.created_at().to_rfc3339());
    let _ = write!(out, "  Updated:     {}", req.updated_at().to_rfc3339());
    out
}

pub fn classification(c: &Classification) -> String {
    let keywords = if c.keywords_detected.is_empty() {
        "(none)".to_string()
    } else {
        c.keywords_detected.join(", ")
    };

    let mut out = String::new();
    let _ = writeln!(out, "Priority:   {}  ({})", c.priority, c.priority_reason);
    let _ = writeln!(out, "Department: {}  ({})", c.department, c.department_reason);
    let _ = writeln!(out, "Category:   {}", c.category);
    let _ = writeln!(out, "Confidence: {}%", c.confidence);
    let _ = write!(out, "Keywords:   {keywords}");
    out
}

pub fn advance_outcome(id: u64, outcome: AdvanceOutcome) -> String {
    match outcome {
        AdvanceOutcome::Advanced { from, to } => format!("Request #{id}: {from} -> {to}"),
        AdvanceOutcome::AlreadyTerminal => {
            format!("Request #{id} is already {}", LifecycleState::Closed)
        }
    }
}

/// Render `(label, count)` rows under a heading.
pub fn counts<L: std::fmt::Display>(heading: &str, rows: &[(L, usize)]) -> String {
    let mut out = format!("{heading}\n");
    if rows.is_empty() {
        out.push_str("  (none)\n");
    }
    for (label, count) in rows {
        let _ = writeln!(out, "  {:<16} {count:>5}", label.to_string());
    }
    out
}

pub fn rules(table: &RuleTable) -> String {
    let mut out = String::new();
    for (index, rule) in table.rules().iter().enumerate() {
        let mut sets = Vec::new();
        if let Some(p) = rule.priority {
            sets.push(format!("priority={p}"));
        }
        if let Some(d) = rule.department {
            sets.push(format!("department={d}"));
        }
        if let Some(c) = &rule.category {
            sets.push(format!("category={c}"));
        }
        let _ = writeln!(
            out,
            "{:>2}. [{}] -> {}",
            index + 1,
            rule.keywords.join(", "),
            sets.join(", ")
        );
    }
    let defaults = table.defaults();
    let _ = write!(
        out,
        "defaults: priority={}, department={}, category={}",
        defaults.priority, defaults.department, defaults.category
    );
    out
}
