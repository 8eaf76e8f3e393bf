//! Date-note builder: chronological chaining of date-named documents.
//!
//! # Invariants
//! - Basenames that do not parse completely under the format are not dated
//!   notes and are skipped silently.
//! - Entries are chained in ascending date order; equal dates keep path order.
//! - In stretch mode the last entry falls back to the next calendar day.

use crate::builders::{BuildContext, BuilderOutput, EdgeCandidate};
use crate::error::BuildError;
use crate::graph::Provenance;
use crate::model::document::DocumentRecord;
use crate::paths;
use chrono::format::{Item, StrftimeItems};
use chrono::{Days, NaiveDate};
use std::fmt::Write as _;

struct DatedNote<'a> {
    record: &'a DocumentRecord,
    date: NaiveDate,
}

/// Whether `format` is a usable strftime pattern.
pub fn is_valid_date_format(format: &str) -> bool {
    !format.trim().is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Parses a whole basename as a date under `format`.
///
/// The basename must be exactly the formatted date; `2024-1-5` is not a
/// `%Y-%m-%d` date even though `chrono` would accept it.
pub fn parse_date_basename(basename: &str, format: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(basename, format).ok()?;
    (format_date(date, format).as_deref() == Some(basename)).then_some(date)
}

/// Formats `date` under `format`, or `None` when the pattern cannot render it.
pub fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

pub(crate) fn build(ctx: &BuildContext<'_>) -> BuilderOutput {
    let mut output = BuilderOutput::default();
    let settings = &ctx.settings.date_note;

    let field_name = settings.default_field.as_deref().unwrap_or_default().trim();
    let Some(field) = ctx.field_table.get(field_name) else {
        output.errors.push(BuildError::invalid_setting(
            format!("date_note.default_field is not a configured hierarchy field: `{field_name}`"),
            "settings.date_note.default_field",
        ));
        return output;
    };
    let format = settings.date_format.as_str();
    if !is_valid_date_format(format) {
        output.errors.push(BuildError::invalid_setting(
            format!("date_note.date_format is not a valid date pattern: `{format}`"),
            "settings.date_note.date_format",
        ));
        return output;
    }

    let mut dated: Vec<DatedNote<'_>> = ctx
        .records
        .iter()
        .filter_map(|record| {
            parse_date_basename(record.basename.as_str(), format)
                .map(|date| DatedNote { record, date })
        })
        .collect();
    dated.sort_by_key(|note| note.date);

    for (idx, note) in dated.iter().enumerate() {
        let Some(next_day) = note
            .date
            .checked_add_days(Days::new(1))
            .and_then(|date| format_date(date, format))
        else {
            continue;
        };

        let target_basename = if settings.stretch_to_existing {
            dated
                .get(idx + 1)
                .map(|next| next.record.basename.clone())
                .unwrap_or(next_day)
        } else {
            next_day
        };

        let record = note.record;
        let target = paths::build(
            record.folder.as_str(),
            target_basename.as_str(),
            record.extension.as_str(),
        );
        if target == record.path {
            continue;
        }

        output.edges.push(EdgeCandidate {
            source: record.path.clone(),
            target,
            field: field.name.clone(),
            provenance: Provenance::DateNote,
            source_order: None,
            target_order: None,
        });
    }

    output
}
