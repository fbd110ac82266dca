//! The `Lesson` record and the name/group splitting rule.

use serde::Serialize;

/// One scheduled class-period occurrence, as extracted from a day-cell.
///
/// Text fields hold the raw cell text, untrimmed. Grouping is derived once
/// at construction: a name like `j.angielski-1/2` means the class is split
/// into sub-groups for this period, and the `-` suffix names the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lesson {
    /// Row position within the plan table, minus the header-row offset.
    pub period_index: usize,
    /// Position among the row's day-cells: 0 = Monday .. 4 = Friday.
    pub day_index: usize,
    /// Raw lesson-name text, group suffix included.
    pub name: String,
    pub room_number: String,
    pub teacher_id: String,
    /// Second `-`-separated segment of `name`, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// First `-`-separated segment of `name`; equals `name` when ungrouped.
    pub name_without_group: String,
}

impl Lesson {
    /// Build a record, deriving the group fields by splitting `name` on `-`.
    ///
    /// No validation happens here; empty-name records are filtered by the
    /// extraction pass, not by the constructor.
    pub fn new(
        period_index: usize,
        day_index: usize,
        name: String,
        room_number: String,
        teacher_id: String,
    ) -> Self {
        let mut parts = name.split('-');
        let first = parts.next().unwrap_or_default().to_string();
        let group = parts.next().map(str::to_string);
        let name_without_group = if group.is_some() { first } else { name.clone() };

        Self {
            period_index,
            day_index,
            name,
            room_number,
            teacher_id,
            group,
            name_without_group,
        }
    }

    /// Whether the class is split into sub-groups for this period.
    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }
}
