//! SKPort wire models.
//!
//! Every endpoint wraps its payload in `{code, message, data}`. `code 0` is
//! success; the remaining codes we care about are listed in `lib.rs`.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct SkResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttendanceData {
    #[serde(default)]
    pub has_today: bool,
    #[serde(default)]
    pub calendar: Vec<CalendarEntry>,
    #[serde(default)]
    pub resource_info_map: HashMap<String, ResourceInfo>,
}

impl AttendanceData {
    pub fn total_signed(&self) -> usize {
        self.calendar.iter().filter(|c| c.done).count()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarEntry {
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClaimData {
    #[serde(default)]
    pub award_ids: Vec<AwardRef>,
    #[serde(default)]
    pub resource_info_map: HashMap<String, ResourceInfo>,
}

/// Award ids arrive either as bare strings or `{id: ...}` objects depending
/// on the endpoint version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AwardRef {
    Id(String),
    Tagged { id: String },
}

impl AwardRef {
    pub fn id(&self) -> &str {
        match self {
            AwardRef::Id(id) => id,
            AwardRef::Tagged { id } => id,
        }
    }
}

impl ClaimData {
    /// Human-opaque reward summary: "Orundum x100, Gold x2000".
    pub fn reward_text(&self) -> Option<String> {
        let parts: Vec<String> = self
            .award_ids
            .iter()
            .filter_map(|award| self.resource_info_map.get(award.id()))
            .map(|r| format!("{} x{}", r.name, r.count))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
