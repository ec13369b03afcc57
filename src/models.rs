use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// Wall-clock time within a day, minute precision, written as `H:MM AM/PM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub const NOON: TimeOfDay = TimeOfDay::at(12, 0);
    pub const FOUR_PM: TimeOfDay = TimeOfDay::at(16, 0);
    pub const SIX_PM: TimeOfDay = TimeOfDay::at(18, 0);

    /// 24-hour constructor for fixed times; `hour` < 24 and `minute` < 60.
    pub const fn at(hour: u16, minute: u16) -> Self {
        TimeOfDay {
            minutes: hour * 60 + minute,
        }
    }

    /// Parses `9:00 AM`, `09:00 am` or `12:30 PM`. Midnight is `12:00 AM`.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let time = NaiveTime::parse_from_str(raw.trim(), "%I:%M %p").map_err(|err| {
            CoreError::invalid_input("time of day", raw, format!("expected H:MM AM/PM ({err})"))
        })?;
        Ok(TimeOfDay {
            minutes: (time.hour() * 60 + time.minute()) as u16,
        })
    }

    pub fn hour(&self) -> u16 {
        self.minutes / 60
    }

    pub fn minute(&self) -> u16 {
        self.minutes % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meridiem = if self.hour() < 12 { "AM" } else { "PM" };
        let hour = match self.hour() % 12 {
            0 => 12,
            h => h,
        };
        write!(f, "{}:{:02} {}", hour, self.minute(), meridiem)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One check-in, as handed back to whoever recorded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub student_id: String,
    pub class_id: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(rename = "time")]
    pub time_of_day: TimeOfDay,
}

impl ScheduleEntry {
    pub fn new(class_name: impl Into<String>, time_of_day: TimeOfDay) -> Self {
        Self {
            class_name: class_name.into(),
            time_of_day,
        }
    }

    /// Builds an entry from raw provisioning data, rejecting a malformed time.
    pub fn parse(class_name: impl Into<String>, time: &str) -> CoreResult<Self> {
        Ok(Self::new(class_name, TimeOfDay::parse(time)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineItem {
    #[serde(rename = "time")]
    pub time_of_day: TimeOfDay,
    pub activity: String,
}

impl fmt::Display for RoutineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time_of_day, self.activity)
    }
}

#[derive(Debug, Clone)]
pub struct ClassPresence {
    pub class_id: String,
    pub student_count: usize,
    pub check_ins: usize,
}

#[derive(Debug, Clone)]
pub struct StudentCheckIns {
    pub student_id: String,
    pub class_count: usize,
    pub check_ins: usize,
    pub last_seen: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_digit_hours() {
        let time = TimeOfDay::parse("9:00 AM").unwrap();
        assert_eq!(time.hour(), 9);
        assert_eq!(time.minute(), 0);
        assert_eq!(time.to_string(), "9:00 AM");
    }

    #[test]
    fn noon_and_midnight_are_distinct() {
        let noon = TimeOfDay::parse("12:00 PM").unwrap();
        let midnight = TimeOfDay::parse("12:00 AM").unwrap();
        assert_eq!(noon, TimeOfDay::NOON);
        assert_eq!(midnight.hour(), 0);
        assert!(midnight < noon);
        assert_eq!(midnight.to_string(), "12:00 AM");
    }

    #[test]
    fn accepts_padding_and_lowercase_meridiem() {
        assert_eq!(
            TimeOfDay::parse(" 04:00 pm ").unwrap(),
            TimeOfDay::FOUR_PM
        );
    }

    #[test]
    fn rejects_malformed_times() {
        for raw in ["", "9 AM", "13:00 PM", "9:75 AM", "noon", "14:00"] {
            let err = TimeOfDay::parse(raw).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput { .. }), "{raw}");
        }
    }

    #[test]
    fn afternoon_sorts_after_late_morning() {
        let eleven = TimeOfDay::parse("11:00 AM").unwrap();
        let one = TimeOfDay::parse("1:00 PM").unwrap();
        assert!(eleven < one);
    }

    #[test]
    fn schedule_entry_uses_wire_names() {
        let entry = ScheduleEntry::parse("Data Structures", "11:00 AM").unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"class": "Data Structures", "time": "11:00 AM"})
        );

        let bad: Result<ScheduleEntry, _> =
            serde_json::from_value(serde_json::json!({"class": "X", "time": "25:00 PM"}));
        assert!(bad.is_err());
    }
}
