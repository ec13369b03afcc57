use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use parking_lot::RwLock;

use crate::models::AttendanceEvent;

/// Every check-in ever recorded, student → class → timestamps in insertion order.
pub type Ledger = BTreeMap<String, BTreeMap<String, Vec<NaiveDateTime>>>;

/// Append-only store of check-in timestamps keyed by (student, class).
///
/// One lock guards both map levels, so an append is never half visible to a reader.
#[derive(Debug, Default)]
pub struct AttendanceStore {
    ledger: RwLock<Ledger>,
}

impl AttendanceStore {
    pub fn append(&self, student_id: &str, class_id: &str, timestamp: NaiveDateTime) {
        let mut ledger = self.ledger.write();
        ledger
            .entry(student_id.to_string())
            .or_default()
            .entry(class_id.to_string())
            .or_default()
            .push(timestamp);
    }

    pub fn students_in(&self, class_id: &str) -> BTreeSet<String> {
        let ledger = self.ledger.read();
        ledger
            .iter()
            .filter(|(_, classes)| {
                classes
                    .get(class_id)
                    .is_some_and(|stamps| !stamps.is_empty())
            })
            .map(|(student_id, _)| student_id.clone())
            .collect()
    }

    pub fn buckets_for(&self, student_id: &str) -> BTreeMap<String, Vec<NaiveDateTime>> {
        self.ledger
            .read()
            .get(student_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn copy(&self) -> Ledger {
        self.ledger.read().clone()
    }

    /// Swaps in a whole ledger, dropping classes and students with no check-ins.
    pub fn replace(&self, mut ledger: Ledger) {
        ledger.retain(|_, classes| {
            classes.retain(|_, stamps| !stamps.is_empty());
            !classes.is_empty()
        });
        *self.ledger.write() = ledger;
    }

    pub fn checked_in_students(&self) -> usize {
        self.ledger.read().len()
    }
}

/// Records attendance and answers "who is in this class" over an owned [`AttendanceStore`].
#[derive(Debug, Default)]
pub struct AttendanceService {
    store: AttendanceStore,
}

impl AttendanceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a student present. Repeated check-ins for the same class are all kept.
    pub fn record(
        &self,
        student_id: &str,
        class_id: &str,
        timestamp: NaiveDateTime,
    ) -> AttendanceEvent {
        self.store.append(student_id, class_id, timestamp);
        AttendanceEvent {
            student_id: student_id.to_string(),
            class_id: class_id.to_string(),
            timestamp,
        }
    }

    /// Students with at least one check-in for `class_id`. Empty when nobody has checked in.
    pub fn present_students(&self, class_id: &str) -> BTreeSet<String> {
        self.store.students_in(class_id)
    }

    pub fn history(&self, student_id: &str) -> BTreeMap<String, Vec<NaiveDateTime>> {
        self.store.buckets_for(student_id)
    }

    pub fn ledger(&self) -> Ledger {
        self.store.copy()
    }

    pub fn restore(&self, ledger: Ledger) {
        self.store.replace(ledger);
    }

    pub fn checked_in_students(&self) -> usize {
        self.store.checked_in_students()
    }
}
