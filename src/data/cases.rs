//! The flat case table and its routing to organizational groups.

use std::collections::HashSet;

use crate::config::CaseLayout;
use crate::data::availability::AvailabilityBook;
use crate::data::sponsor::parse_sponsors;
use crate::data::workbook::{Cell, IngestError, Workbook};
use crate::model::Case;

/// Category used when a row has none.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Reads cases without a group; see [`route_cases`].
///
/// Rows with an empty id are skipped, as are repeated ids after the first.
pub fn load_cases(workbook: &Workbook, layout: &CaseLayout) -> Result<Vec<Case>, IngestError> {
    let sheet = match &layout.sheet {
        Some(name) => workbook.sheet(name)?,
        None => workbook.first()?,
    };

    let mut seen = HashSet::new();
    let mut cases = Vec::new();
    for row in layout.header_rows..sheet.height() {
        let id = sheet.cell(row, layout.id_column).text();
        if id.is_empty() {
            continue;
        }
        if !seen.insert(id.clone()) {
            tracing::warn!(case_id = %id, row, "duplicate case id skipped");
            continue;
        }
        let category = match layout.category_column {
            Some(column) => sheet.cell(row, column).text(),
            None => sheet.rows[row].last().map(Cell::text).unwrap_or_default(),
        };
        let category = if category.is_empty() {
            UNKNOWN_CATEGORY.to_string()
        } else {
            category
        };
        let sponsors = parse_sponsors(&sheet.cell(row, layout.sponsor_column).text());
        if sponsors.is_empty() {
            tracing::warn!(case_id = %id, "case without sponsors");
        }
        cases.push(Case::new(
            id,
            sheet.cell(row, layout.name_column).text(),
            String::new(),
            category,
            sponsors,
        ));
    }
    tracing::info!(sheet = %sheet.name, cases = cases.len(), "cases loaded");
    Ok(cases)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutedCases {
    pub routed: Vec<Case>,
    pub unrouted: Vec<Case>,
}

/// Tags each case with the group of its first sponsor found in `book`.
///
/// The primary sponsor decides; the secondary is consulted only when the
/// primary belongs to no group.
pub fn route_cases(cases: Vec<Case>, book: &AvailabilityBook) -> RoutedCases {
    let mut out = RoutedCases::default();
    for mut case in cases {
        let group = case
            .sponsors
            .iter()
            .find_map(|sponsor| book.group_of(sponsor))
            .map(str::to_string);
        match group {
            Some(group) => {
                case.group = group;
                out.routed.push(case);
            }
            None => out.unrouted.push(case),
        }
    }
    tracing::info!(
        routed = out.routed.len(),
        unrouted = out.unrouted.len(),
        "cases routed"
    );
    out
}
