//! Evaluator availability: one sheet per organizational group.
//!
//! Layout (defaults in [`AvailabilityLayout`]): a few header rows whose merged
//! cells name the slots (day over shift, for instance), then one row per
//! evaluator with id, participation count, optional weight and one
//! affirmative/negative cell per slot.

use crate::config::AvailabilityLayout;
use crate::data::workbook::{Sheet, Workbook};
use crate::model::{EvaluatorRecord, Slot};
use crate::planner::GroupInput;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvailabilityBook {
    pub slots: Vec<Slot>,
    pub groups: Vec<GroupInput>,
}

impl AvailabilityBook {
    /// Evaluator id → group name, first group wins for ids listed twice.
    pub fn group_of(&self, evaluator: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|group| group.evaluators.iter().any(|e| e.id == evaluator))
            .map(|group| group.name.as_str())
    }
}

pub fn load_groups(
    workbook: &Workbook,
    layout: &AvailabilityLayout,
    slot_count: usize,
) -> AvailabilityBook {
    let sheets = workbook.sheets();
    let group_sheets = &sheets[..sheets.len().saturating_sub(layout.skip_trailing_sheets)];

    let slots = group_sheets
        .first()
        .map(|sheet| slot_labels(sheet, layout, slot_count))
        .unwrap_or_else(|| Slot::numbered(slot_count));

    let groups: Vec<GroupInput> = group_sheets
        .iter()
        .map(|sheet| {
            let evaluators = read_evaluators(sheet, layout, slot_count);
            tracing::info!(group = %sheet.name, evaluators = evaluators.len(), "availability loaded");
            GroupInput::new(sheet.name.trim(), evaluators)
        })
        .collect();

    AvailabilityBook { slots, groups }
}

/// Joins the header rows above each slot column, carrying merged cells rightwards.
fn slot_labels(sheet: &Sheet, layout: &AvailabilityLayout, slot_count: usize) -> Vec<Slot> {
    let header_width = (0..layout.header_rows)
        .filter_map(|row| sheet.rows.get(row))
        .filter_map(|cells| cells.iter().rposition(|cell| !cell.is_empty()))
        .map(|last| last + 1)
        .max()
        .unwrap_or(0);
    let mut carried = vec![String::new(); layout.header_rows];
    (0..slot_count)
        .map(|index| {
            let column = layout.first_slot_column + index;
            if column >= header_width {
                return Slot::new(index, format!("Slot {}", index + 1));
            }
            let mut parts = Vec::new();
            for (row, carry) in carried.iter_mut().enumerate() {
                let cell = sheet.cell(row, column);
                if !cell.is_empty() {
                    *carry = cell.text();
                }
                if !carry.is_empty() {
                    parts.push(carry.clone());
                }
            }
            if parts.is_empty() {
                Slot::new(index, format!("Slot {}", index + 1))
            } else {
                Slot::new(index, parts.join(" / "))
            }
        })
        .collect()
}

fn read_evaluators(sheet: &Sheet, layout: &AvailabilityLayout, slot_count: usize) -> Vec<EvaluatorRecord> {
    let markers: Vec<String> = layout
        .available_markers
        .iter()
        .map(|marker| marker.trim().to_lowercase())
        .collect();

    (layout.header_rows..sheet.height())
        .filter_map(|row| {
            let id = sheet.cell(row, layout.id_column).text();
            if id.is_empty() {
                return None;
            }
            let participation = sheet
                .cell(row, layout.participation_column)
                .number()
                .map_or(0, |n| n.max(0.0).round() as u32);
            let weight = layout
                .weight_column
                .and_then(|column| sheet.cell(row, column).number())
                .unwrap_or(0.0);
            let available = (0..slot_count)
                .map(|slot| {
                    let value = sheet.cell(row, layout.first_slot_column + slot).text().to_lowercase();
                    markers.iter().any(|marker| *marker == value)
                })
                .collect();
            Some(EvaluatorRecord::new(id, participation, weight, available))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_sheet(name: &str, rows: &[[&str; 6]]) -> Sheet {
        let mut all: Vec<Vec<String>> = vec![
            vec!["", "", "", "", "Monday", ""].into_iter().map(String::from).collect(),
            vec!["", "", "", "", "Morning", "Afternoon"].into_iter().map(String::from).collect(),
            vec!["Name", "Email", "Times", "Weight", "", ""].into_iter().map(String::from).collect(),
        ];
        all.extend(rows.iter().map(|row| row.iter().map(|s| s.to_string()).collect()));
        Sheet::from_strings(name, &all)
    }

    #[test]
    fn reads_groups_and_skips_summary_sheet() {
        let wb = Workbook::new(vec![
            group_sheet(
                "Math",
                &[
                    ["Ana", "ana@x", "2", "0.5", "Sí", "No"],
                    ["", "", "", "", "", ""],
                    ["Bo", "bo@x", "", "", "si", "SÍ"],
                ],
            ),
            group_sheet("Physics", &[["Cy", "cy@x", "0", "0", "No", "Sí"]]),
            Sheet::from_strings("Summary", &[vec!["total"]]),
        ]);
        let book = load_groups(&wb, &AvailabilityLayout::default(), 2);

        assert_eq!(book.groups.len(), 2);
        assert_eq!(book.groups[0].name, "Math");
        let math = &book.groups[0].evaluators;
        assert_eq!(math.len(), 2);
        assert_eq!(math[0].participation, 2);
        assert_eq!(math[0].weight, 0.5);
        assert_eq!(math[0].available, vec![true, false]);
        assert_eq!(math[1].available, vec![true, true]);
        assert_eq!(book.group_of("cy@x"), Some("Physics"));
    }

    #[test]
    fn merged_header_cells_are_carried() {
        let wb = Workbook::new(vec![group_sheet("G", &[]), Sheet::default()]);
        let book = load_groups(&wb, &AvailabilityLayout::default(), 3);
        let labels: Vec<&str> = book.slots.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Monday / Morning", "Monday / Afternoon", "Slot 3"]);
    }
}
