//! Calendar file schedule source.
//!
//! The file maps day labels to slot labels, in display order:
//! `{"Monday": ["09:00", "10:30"], "Friday": ["14:00"]}`.

use async_trait::async_trait;
use concierge_core::{
    schedule::{DaySlots, ScheduleSnapshot},
    traits::ScheduleSource,
};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

/// Reads open slots fresh from a JSON file on every request.
pub struct CalendarFile {
    path: PathBuf,
}

impl CalendarFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse calendar JSON, keeping key order. `None` if the shape is wrong.
fn parse_calendar(content: &str) -> Option<Vec<DaySlots>> {
    let map: Map<String, Value> = serde_json::from_str(content).ok()?;
    map.into_iter()
        .map(|(day, slots)| {
            let slots = slots
                .as_array()?
                .iter()
                .map(|s| s.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()?;
            Some(DaySlots { day, slots })
        })
        .collect()
}

#[async_trait]
impl ScheduleSource for CalendarFile {
    async fn snapshot(&self) -> ScheduleSnapshot {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return ScheduleSnapshot::NoSlots,
            Err(e) => {
                warn!("calendar: failed to read {}: {e}", self.path.display());
                return ScheduleSnapshot::Unavailable;
            }
        };

        match parse_calendar(&content) {
            Some(days) => ScheduleSnapshot::Slots(days),
            None => {
                warn!("calendar: {} is malformed", self.path.display());
                ScheduleSnapshot::Unavailable
            }
        }
    }
}
