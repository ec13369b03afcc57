use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::models::{ScheduleEntry, TimeOfDay};

const ORIENTATION_CLASS: &str = "New Student Orientation";
const ORIENTATION_TASK: &str = "Explore the campus map.";
const ORIENTATION_GOAL: &str = "Get comfortable with the new environment.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogs {
    #[serde(default)]
    pub schedules: BTreeMap<String, Vec<ScheduleEntry>>,
    #[serde(default)]
    pub tasks: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub goals: BTreeMap<String, Vec<String>>,
}

impl Catalogs {
    pub fn schedule_for(&self, student_id: &str) -> &[ScheduleEntry] {
        self.schedules
            .get(student_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn tasks_for(&self, student_id: &str) -> &[String] {
        self.tasks
            .get(student_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn goals_for(&self, student_id: &str) -> &[String] {
        self.goals
            .get(student_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn students(&self) -> BTreeSet<String> {
        self.schedules
            .keys()
            .chain(self.tasks.keys())
            .chain(self.goals.keys())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct ActivitySourceRegistry {
    current: RwLock<Arc<Catalogs>>,
}

impl ActivitySourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalogs(catalogs: Catalogs) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalogs)),
        }
    }

    /// Registry preloaded with the demo roster.
    pub fn seeded() -> Self {
        Self::from_catalogs(demo_catalogs())
    }

    pub fn snapshot(&self) -> Arc<Catalogs> {
        Arc::clone(&self.current.read())
    }

    pub fn replace(&self, catalogs: Catalogs) {
        *self.current.write() = Arc::new(catalogs);
    }

    pub fn schedule_for(&self, student_id: &str) -> Vec<ScheduleEntry> {
        self.snapshot().schedule_for(student_id).to_vec()
    }

    pub fn tasks_for(&self, student_id: &str) -> Vec<String> {
        self.snapshot().tasks_for(student_id).to_vec()
    }

    pub fn goals_for(&self, student_id: &str) -> Vec<String> {
        self.snapshot().goals_for(student_id).to_vec()
    }

    pub fn students(&self) -> BTreeSet<String> {
        self.snapshot().students()
    }

    /// Replaces a student's schedule. Entries carry already validated times.
    pub fn upsert_schedule(&self, student_id: &str, schedule: Vec<ScheduleEntry>) {
        self.update(|catalogs| {
            catalogs.schedules.insert(student_id.to_string(), schedule);
        });
    }

    pub fn upsert_tasks(&self, student_id: &str, tasks: Vec<String>) {
        self.update(|catalogs| {
            catalogs.tasks.insert(student_id.to_string(), tasks);
        });
    }

    pub fn upsert_goals(&self, student_id: &str, goals: Vec<String>) {
        self.update(|catalogs| {
            catalogs.goals.insert(student_id.to_string(), goals);
        });
    }

    /// Gives every student without a schedule the orientation day. Returns who was enrolled.
    pub fn enroll_students<I, S>(&self, student_ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut enrolled = Vec::new();
        self.update(|catalogs| {
            for student_id in student_ids {
                let student_id = student_id.as_ref();
                if catalogs.schedules.contains_key(student_id) {
                    continue;
                }
                catalogs.schedules.insert(
                    student_id.to_string(),
                    vec![ScheduleEntry::new(ORIENTATION_CLASS, TimeOfDay::at(10, 0))],
                );
                catalogs
                    .tasks
                    .insert(student_id.to_string(), vec![ORIENTATION_TASK.to_string()]);
                catalogs
                    .goals
                    .insert(student_id.to_string(), vec![ORIENTATION_GOAL.to_string()]);
                enrolled.push(student_id.to_string());
            }
        });
        enrolled
    }

    /// Copy-on-write under the write lock.
    fn update(&self, edit: impl FnOnce(&mut Catalogs)) {
        let mut current = self.current.write();
        let mut next = Catalogs::clone(&current);
        edit(&mut next);
        *current = Arc::new(next);
    }
}

fn demo_catalogs() -> Catalogs {
    let mut catalogs = Catalogs::default();

    let schedules = [
        (
            "S001",
            vec![
                ("Introduction to Python", TimeOfDay::at(9, 0)),
                ("Data Structures", TimeOfDay::at(11, 0)),
            ],
        ),
        (
            "S002",
            vec![
                ("Web Development", TimeOfDay::at(10, 0)),
                ("Introduction to Python", TimeOfDay::at(13, 0)),
            ],
        ),
        ("S003", vec![("Machine Learning", TimeOfDay::at(14, 0))]),
    ];
    for (student_id, entries) in schedules {
        catalogs.schedules.insert(
            student_id.to_string(),
            entries
                .into_iter()
                .map(|(class_name, time)| ScheduleEntry::new(class_name, time))
                .collect(),
        );
    }

    let tasks = [
        (
            "S001",
            vec![
                "Read chapter 5 of the Python textbook.",
                "Complete the data structures assignment.",
            ],
        ),
        (
            "S002",
            vec![
                "Watch the Flask tutorial video.",
                "Start the project for Web Development.",
            ],
        ),
        (
            "S003",
            vec![
                "Review linear algebra concepts.",
                "Set up the environment for your ML model.",
            ],
        ),
    ];
    for (student_id, items) in tasks {
        catalogs.tasks.insert(
            student_id.to_string(),
            items.into_iter().map(str::to_string).collect(),
        );
    }

    let goals = [
        ("S001", vec!["Learn Git", "Improve public speaking"]),
        ("S002", vec!["Build a personal portfolio website"]),
        ("S003", vec!["Contribute to an open-source project"]),
    ];
    for (student_id, items) in goals {
        catalogs.goals.insert(
            student_id.to_string(),
            items.into_iter().map(str::to_string).collect(),
        );
    }

    catalogs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_student_has_empty_catalogs() {
        let registry = ActivitySourceRegistry::seeded();
        assert!(registry.schedule_for("S404").is_empty());
        assert!(registry.tasks_for("S404").is_empty());
        assert!(registry.goals_for("S404").is_empty());
    }

    #[test]
    fn seeded_registry_keeps_schedule_order() {
        let registry = ActivitySourceRegistry::seeded();
        let schedule = registry.schedule_for("S002");
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].class_name, "Web Development");
        assert_eq!(schedule[1].time_of_day.to_string(), "1:00 PM");
        assert_eq!(
            registry.students(),
            BTreeSet::from(["S001".to_string(), "S002".to_string(), "S003".to_string()])
        );
    }

    #[test]
    fn upsert_replaces_one_catalog_only() {
        let registry = ActivitySourceRegistry::seeded();
        registry.upsert_tasks("S001", vec!["Draft essay outline".to_string()]);

        assert_eq!(registry.tasks_for("S001"), vec!["Draft essay outline"]);
        assert_eq!(registry.goals_for("S001")[0], "Learn Git");
        assert_eq!(registry.schedule_for("S001").len(), 2);
    }

    #[test]
    fn snapshots_are_unaffected_by_later_updates() {
        let registry = ActivitySourceRegistry::new();
        registry.upsert_goals("S010", vec!["Run a 10k".to_string()]);
        let before = registry.snapshot();

        registry.upsert_goals("S010", vec!["Learn Rust".to_string()]);

        assert_eq!(before.goals_for("S010"), ["Run a 10k".to_string()]);
        assert_eq!(registry.goals_for("S010"), vec!["Learn Rust"]);
    }

    #[test]
    fn enrolls_only_new_students() {
        let registry = ActivitySourceRegistry::seeded();
        let enrolled = registry.enroll_students(["S001", "S020"]);

        assert_eq!(enrolled, vec!["S020"]);
        let schedule = registry.schedule_for("S020");
        assert_eq!(schedule[0].class_name, "New Student Orientation");
        assert_eq!(schedule[0].time_of_day.to_string(), "10:00 AM");
        assert_eq!(registry.tasks_for("S020"), vec!["Explore the campus map."]);
        assert_eq!(registry.schedule_for("S001")[0].class_name, "Introduction to Python");
    }

    #[test]
    fn concurrent_upserts_for_different_students_all_land() {
        let registry = ActivitySourceRegistry::new();
        std::thread::scope(|scope| {
            for n in 0..16 {
                let registry = &registry;
                scope.spawn(move || {
                    registry.upsert_tasks(&format!("S{n:03}"), vec![format!("task {n}")]);
                });
            }
        });
        assert_eq!(registry.students().len(), 16);
    }
}
