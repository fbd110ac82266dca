//! Core extraction pass: Optivum plan HTML -> lesson records.
//!
//! The publisher emits one `table.tabela` per class. Each `tr` past the
//! header is a period, each cell of class `l` inside it is one weekday, and
//! inside a day-cell the classes `p`, `n` and `s` mark lesson names, teacher
//! ids and room numbers. This pass is tolerant by policy: markup that does
//! not match the expected structure degrades to an empty or partial result,
//! it never errors.

use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};

use crate::lesson::Lesson;

/// Leading table rows that carry column headers rather than periods.
/// The period index of a row is its position minus this offset.
pub const HEADER_ROWS: usize = 1;

/// Result of one extraction pass over a plan document.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Records in document order (row-major, day-cells left to right).
    pub lessons: Vec<Lesson>,
    /// Day-cells whose sub-element counts matched neither the single nor
    /// the balanced grouped shape and went through the shared-teacher rule.
    pub irregular_cells: usize,
}

/// Shape of one day-cell, classified from its `.p`/`.n`/`.s` counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellShape {
    /// At most one lesson name: each field is the cell's single text.
    Single,
    /// Two sub-groups, one name/id/room each.
    BalancedGroup,
    /// Grouped cell with mismatched counts. Known Optivum defect: some
    /// combined slots (religion/ethics) tag the shared teacher with the
    /// lesson-name class, so the last `.p` slot is really a teacher label.
    SharedTeacherGroup,
}

impl CellShape {
    fn classify(n_lessons: usize, n_ids: usize, n_rooms: usize) -> Self {
        if n_lessons <= 1 {
            CellShape::Single
        } else if n_lessons + n_ids + n_rooms == 6 {
            CellShape::BalancedGroup
        } else {
            CellShape::SharedTeacherGroup
        }
    }
}

struct Selectors {
    row: Selector,
    day_cell: Selector,
    lesson_name: Selector,
    teacher_id: Selector,
    room: Selector,
}

impl Selectors {
    fn parse() -> Option<Self> {
        Some(Self {
            row: Selector::parse("table.tabela tr").ok()?,
            day_cell: Selector::parse(".l").ok()?,
            lesson_name: Selector::parse(".p").ok()?,
            teacher_id: Selector::parse(".n").ok()?,
            room: Selector::parse(".s").ok()?,
        })
    }
}

/// Extract all lesson records from a plan document.
///
/// Records appear in document order; sorting and caching live one layer up
/// in [`crate::plan::PlanScraper`].
pub fn parse_timetable(html: &str) -> ParseOutcome {
    let Some(sel) = Selectors::parse() else {
        return ParseOutcome::default();
    };

    let document = Html::parse_document(html);
    let mut outcome = ParseOutcome::default();

    let mut saw_rows = false;
    for (row_position, row) in document.select(&sel.row).enumerate() {
        saw_rows = true;
        let period_index = row_position.saturating_sub(HEADER_ROWS);
        for (day_index, cell) in row.select(&sel.day_cell).enumerate() {
            extract_cell(&sel, cell, period_index, day_index, &mut outcome);
        }
    }

    if !saw_rows {
        warn!("no table.tabela rows in document, returning empty plan");
        return outcome;
    }

    debug!(
        "extracted {} lessons ({} irregular cells)",
        outcome.lessons.len(),
        outcome.irregular_cells
    );
    outcome
}

fn extract_cell(
    sel: &Selectors,
    cell: ElementRef,
    period_index: usize,
    day_index: usize,
    outcome: &mut ParseOutcome,
) {
    let names = texts(cell, &sel.lesson_name);
    let ids = texts(cell, &sel.teacher_id);
    let rooms = texts(cell, &sel.room);

    let shape = CellShape::classify(names.len(), ids.len(), rooms.len());
    match shape {
        CellShape::Single => {
            let lesson = Lesson::new(
                period_index,
                day_index,
                names.concat(),
                rooms.concat(),
                ids.concat(),
            );
            push_if_named(outcome, lesson);
        }
        CellShape::BalancedGroup | CellShape::SharedTeacherGroup => {
            // Balanced cells yield one record per name; unbalanced ones stop
            // one short, because the overflow slot is not a real lesson.
            let mli_max = match shape {
                CellShape::BalancedGroup => names.len(),
                _ => {
                    outcome.irregular_cells += 1;
                    names.len() - 1
                }
            };
            for mli in 0..mli_max {
                let teacher_id = if names.len() != ids.len() {
                    // Shared-teacher rule: the overflow name slot holds the
                    // teacher label common to all sub-groups in this cell.
                    names.get(mli_max).cloned().unwrap_or_default()
                } else {
                    ids.get(mli).cloned().unwrap_or_default()
                };
                let lesson = Lesson::new(
                    period_index,
                    day_index,
                    names[mli].clone(),
                    rooms.get(mli).cloned().unwrap_or_default(),
                    teacher_id,
                );
                push_if_named(outcome, lesson);
            }
        }
    }
}

/// Texts of all elements matching `selector` inside the cell, untrimmed,
/// in document order.
fn texts(cell: ElementRef, selector: &Selector) -> Vec<String> {
    cell.select(selector)
        .map(|el| el.text().collect::<String>())
        .collect()
}

fn push_if_named(outcome: &mut ParseOutcome, lesson: Lesson) {
    if !lesson.name.is_empty() {
        outcome.lessons.push(lesson);
    }
}
