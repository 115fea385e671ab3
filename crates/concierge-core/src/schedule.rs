//! Live availability snapshot rendered into the instruction prompt.

use serde::{Deserialize, Serialize};

/// Open slots for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub day: String,
    pub slots: Vec<String>,
}

/// Result of reading the schedule source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSnapshot {
    /// Days in calendar order with their open slots.
    Slots(Vec<DaySlots>),
    /// No calendar exists.
    NoSlots,
    /// The calendar exists but could not be read.
    Unavailable,
}

impl ScheduleSnapshot {
    /// Render as free text for the prompt.
    pub fn render(&self) -> String {
        match self {
            Self::Slots(days) => days
                .iter()
                .map(|d| format!("• *{}*: {}", d.day, d.slots.join(", ")))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::NoSlots => "No slots available.".to_string(),
            Self::Unavailable => "Error loading schedule.".to_string(),
        }
    }
}
