use std::fmt::Write as _;

use crate::observatum::tools::check::summarize;
use crate::observatum::tools::model::{EntityOutcome, KeyField};

/// Renders a check run as human-readable text.
///
/// Raw key values are printed verbatim, and the three failure shapes — no
/// row found, row found but keys differ, and a failed query — keep distinct
/// wording so they can never be read as one generic "not found".
pub fn render_outcomes(outcomes: &[EntityOutcome]) -> String {
    let mut out = String::new();

    for outcome in outcomes {
        match outcome {
            EntityOutcome::Compared(result) => {
                let _ = writeln!(out, "{}: {}", result.entity_name, result.status);
                if let Some(key) = &result.primary_key {
                    let _ = writeln!(out, "    primary key:   {key}");
                }
                if let Some(key) = &result.reference_key {
                    let _ = writeln!(out, "    reference key: {key}");
                }
                if let Some(parent) = &result.reference_parent_key {
                    let _ = writeln!(out, "    parent key:    {parent}");
                }
            }
            EntityOutcome::QueryFailed {
                entity_name,
                message,
            } => {
                let _ = writeln!(out, "{entity_name}: query failed");
                let _ = writeln!(out, "    {message}");
            }
        }
    }

    let summary = summarize(outcomes);
    let _ = writeln!(
        out,
        "{} entities checked: {} matched, {} mismatched, {} missing in primary, {} missing in reference, {} failed",
        outcomes.len(),
        summary.matched,
        summary.mismatched,
        summary.missing_in_primary,
        summary.missing_in_reference,
        summary.failed,
    );
    out
}

/// Renders a key-field inventory as aligned `column = value` lines.
pub fn render_inventory(fields: &[KeyField]) -> String {
    if fields.is_empty() {
        return String::from("no key fields matched\n");
    }

    let width = fields
        .iter()
        .map(|field| field.column.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for field in fields {
        let _ = writeln!(out, "{:<width$} = {}", field.column, field.value);
    }
    out
}
