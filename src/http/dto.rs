use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{AttendanceEvent, ScheduleEntry};

pub const PRESENT: &str = "Present";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAttendanceRequest {
    pub student_id: String,
    pub class_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAttendanceResponse {
    pub message: String,
    pub event: AttendanceEvent,
}

/// Student id → `"Present"` for everyone who has checked in.
pub type PresenceResponse = BTreeMap<String, String>;

/// Schedule row as sent by provisioning clients; the time is validated on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntryDto {
    pub class: String,
    pub time: String,
}

impl TryFrom<ScheduleEntryDto> for ScheduleEntry {
    type Error = CoreError;

    fn try_from(dto: ScheduleEntryDto) -> Result<Self, Self::Error> {
        ScheduleEntry::parse(dto.class, &dto.time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertResponse {
    pub student_id: String,
    pub count: usize,
}

/// Roster push from the management client. Course names are accepted but not used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDataRequest {
    #[serde(default)]
    pub students: BTreeMap<String, String>,
    #[serde(default)]
    pub courses: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDataResponse {
    pub message: String,
    pub enrolled: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub students: usize,
    pub checked_in_students: usize,
}
