use crate::models::{RoutineItem, ScheduleEntry, TimeOfDay};
use crate::registry::ActivitySourceRegistry;

pub const STUDY_ACTIVITY: &str = "Study for upcoming tests.";

/// Builds a student's day from one consistent snapshot of the registry.
pub fn daily_routine(registry: &ActivitySourceRegistry, student_id: &str) -> Vec<RoutineItem> {
    let catalogs = registry.snapshot();
    build_routine(
        catalogs.schedule_for(student_id),
        catalogs.tasks_for(student_id),
        catalogs.goals_for(student_id),
    )
}

/// Classes first, then the study, task and goal anchors, stably sorted by time of day.
/// Only the first task and the first goal are surfaced.
pub fn build_routine(
    schedule: &[ScheduleEntry],
    tasks: &[String],
    goals: &[String],
) -> Vec<RoutineItem> {
    let mut routine: Vec<RoutineItem> = schedule
        .iter()
        .map(|entry| RoutineItem {
            time_of_day: entry.time_of_day,
            activity: format!("Class: {}", entry.class_name),
        })
        .collect();

    routine.push(RoutineItem {
        time_of_day: TimeOfDay::NOON,
        activity: STUDY_ACTIVITY.to_string(),
    });

    if let Some(task) = tasks.first() {
        routine.push(RoutineItem {
            time_of_day: TimeOfDay::FOUR_PM,
            activity: format!("Work on a personalized task: {task}"),
        });
    }

    if let Some(goal) = goals.first() {
        routine.push(RoutineItem {
            time_of_day: TimeOfDay::SIX_PM,
            activity: format!("Work towards a long-term goal: {goal}"),
        });
    }

    // sort_by_key is stable: equal times keep emission order
    routine.sort_by_key(|item| item.time_of_day);
    routine
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(routine: &[RoutineItem]) -> Vec<String> {
        routine.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn merges_schedule_with_anchor_activities() {
        let registry = ActivitySourceRegistry::new();
        registry.upsert_schedule(
            "S100",
            vec![ScheduleEntry::parse("Intro to X", "9:00 AM").unwrap()],
        );
        registry.upsert_tasks("S100", vec!["Read ch.5".to_string()]);
        registry.upsert_goals("S100", vec!["Learn Git".to_string()]);

        assert_eq!(
            lines(&daily_routine(&registry, "S100")),
            vec![
                "9:00 AM Class: Intro to X",
                "12:00 PM Study for upcoming tests.",
                "4:00 PM Work on a personalized task: Read ch.5",
                "6:00 PM Work towards a long-term goal: Learn Git",
            ]
        );
    }

    #[test]
    fn unknown_student_only_gets_study_time() {
        let registry = ActivitySourceRegistry::seeded();
        assert_eq!(
            lines(&daily_routine(&registry, "S404")),
            vec!["12:00 PM Study for upcoming tests."]
        );
    }

    #[test]
    fn only_first_task_and_goal_are_used() {
        let registry = ActivitySourceRegistry::seeded();
        let routine = daily_routine(&registry, "S001");
        let activities: Vec<&str> = routine.iter().map(|item| item.activity.as_str()).collect();

        assert_eq!(
            activities,
            vec![
                "Class: Introduction to Python",
                "Class: Data Structures",
                "Study for upcoming tests.",
                "Work on a personalized task: Read chapter 5 of the Python textbook.",
                "Work towards a long-term goal: Learn Git",
            ]
        );
    }

    #[test]
    fn classes_are_interleaved_with_anchors_by_time() {
        let schedule = vec![
            ScheduleEntry::parse("Evening Seminar", "7:30 PM").unwrap(),
            ScheduleEntry::parse("Lab", "1:00 PM").unwrap(),
            ScheduleEntry::parse("Early Lecture", "8:00 AM").unwrap(),
        ];
        let routine = build_routine(&schedule, &[], &["Ship it".to_string()]);

        assert_eq!(
            lines(&routine),
            vec![
                "8:00 AM Class: Early Lecture",
                "12:00 PM Study for upcoming tests.",
                "1:00 PM Class: Lab",
                "6:00 PM Work towards a long-term goal: Ship it",
                "7:30 PM Class: Evening Seminar",
            ]
        );
    }

    #[test]
    fn equal_times_keep_input_order() {
        let schedule = vec![
            ScheduleEntry::parse("Zoology", "9:00 AM").unwrap(),
            ScheduleEntry::parse("Algebra", "9:00 AM").unwrap(),
            ScheduleEntry::parse("Lunch Talk", "12:00 PM").unwrap(),
        ];
        let routine = build_routine(&schedule, &[], &[]);

        assert_eq!(
            lines(&routine),
            vec![
                "9:00 AM Class: Zoology",
                "9:00 AM Class: Algebra",
                "12:00 PM Class: Lunch Talk",
                "12:00 PM Study for upcoming tests.",
            ]
        );
    }

    #[test]
    fn repeated_requests_are_identical() {
        let registry = ActivitySourceRegistry::seeded();
        let first = daily_routine(&registry, "S002");
        let second = daily_routine(&registry, "S002");
        assert_eq!(first, second);
    }
}
