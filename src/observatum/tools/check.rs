use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::observatum::tools::error::ToolError;
use crate::observatum::tools::model::{ComparisonResult, EntityOutcome, KeyStatus};
use crate::observatum::tools::source::TabularSource;

/// Cross-checks a list of entities between a primary and a reference source.
///
/// Entities are checked strictly one at a time, each with at most one lookup
/// per source and no caching across calls. A lookup failure is recorded
/// against that entity as [`EntityOutcome::QueryFailed`] and the run
/// continues with the remaining entities; nothing here retries.
#[instrument(level = "info", skip_all, fields(entity_count = entity_names.len()))]
pub fn check(
    entity_names: &[String],
    primary: &mut dyn TabularSource,
    reference: &mut dyn TabularSource,
) -> Vec<EntityOutcome> {
    let mut outcomes = Vec::with_capacity(entity_names.len());
    for entity_name in entity_names {
        outcomes.push(check_entity(entity_name, primary, reference));
    }

    let summary = summarize(&outcomes);
    info!(
        matched = summary.matched,
        mismatched = summary.mismatched,
        missing_in_primary = summary.missing_in_primary,
        missing_in_reference = summary.missing_in_reference,
        failed = summary.failed,
        "comparison finished"
    );
    outcomes
}

fn check_entity(
    entity_name: &str,
    primary: &mut dyn TabularSource,
    reference: &mut dyn TabularSource,
) -> EntityOutcome {
    let primary_record = match primary.find_by_prefix(entity_name) {
        Ok(record) => record,
        Err(error) => return query_failed(entity_name, "primary", error),
    };

    // No reference lookup when the primary side has no row.
    let Some(primary_record) = primary_record else {
        debug!(entity = %entity_name, "no row in primary source");
        return EntityOutcome::Compared(ComparisonResult::missing_in_primary(entity_name));
    };

    match reference.find_by_prefix(entity_name) {
        Err(error) => query_failed(entity_name, "reference", error),
        Ok(None) => {
            debug!(entity = %entity_name, "no row in reference source");
            EntityOutcome::Compared(ComparisonResult::missing_in_reference(
                entity_name,
                primary_record.key,
            ))
        }
        Ok(Some(reference_record)) => {
            let result = ComparisonResult::compared(
                entity_name,
                primary_record.key,
                reference_record.key,
                reference_record.parent_key,
            );
            debug!(entity = %entity_name, status = %result.status, "entity compared");
            EntityOutcome::Compared(result)
        }
    }
}

fn query_failed(entity_name: &str, side: &str, error: ToolError) -> EntityOutcome {
    warn!(entity = %entity_name, side, %error, "lookup failed");
    EntityOutcome::QueryFailed {
        entity_name: entity_name.to_string(),
        message: format!("{side} lookup: {error}"),
    }
}

/// Aggregate counts over a run's outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub matched: usize,
    pub mismatched: usize,
    pub missing_in_primary: usize,
    pub missing_in_reference: usize,
    pub failed: usize,
}

/// Tallies outcomes by classification.
pub fn summarize(outcomes: &[EntityOutcome]) -> Summary {
    let mut summary = Summary::default();
    for outcome in outcomes {
        match outcome {
            EntityOutcome::Compared(result) => match result.status {
                KeyStatus::Matched => summary.matched += 1,
                KeyStatus::KeyMismatch => summary.mismatched += 1,
                KeyStatus::MissingInPrimary => summary.missing_in_primary += 1,
                KeyStatus::MissingInReference => summary.missing_in_reference += 1,
            },
            EntityOutcome::QueryFailed { .. } => summary.failed += 1,
        }
    }
    summary
}
