use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::info;

use crate::models::ScheduleEntry;
use crate::registry::ActivitySourceRegistry;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub students: usize,
    pub classes: usize,
    pub tasks: usize,
    pub goals: usize,
}

#[derive(Debug, Default)]
struct StudentActivities {
    schedule: Option<Vec<ScheduleEntry>>,
    tasks: Option<Vec<String>>,
    goals: Option<Vec<String>>,
}

/// Enrolls every `student_id` in a `student_id,name` roster. Returns the ids newly enrolled.
pub fn import_roster(
    registry: &ActivitySourceRegistry,
    csv_path: &Path,
) -> anyhow::Result<Vec<String>> {
    let reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open roster {}", csv_path.display()))?;
    let enrolled = enroll_from_reader(registry, reader)?;
    info!(
        path = %csv_path.display(),
        enrolled = enrolled.len(),
        "roster imported"
    );
    Ok(enrolled)
}

fn enroll_from_reader<R: io::Read>(
    registry: &ActivitySourceRegistry,
    mut reader: csv::Reader<R>,
) -> anyhow::Result<Vec<String>> {
    #[derive(Deserialize)]
    struct RosterRow {
        student_id: String,
    }

    let mut student_ids = Vec::new();
    for (index, result) in reader.deserialize::<RosterRow>().enumerate() {
        let row = result.with_context(|| format!("roster row {}", index + 2))?;
        student_ids.push(row.student_id.trim().to_string());
    }

    Ok(registry.enroll_students(student_ids))
}

/// Replaces catalogs from a `student_id,kind,detail,time` file.
///
/// Every row is validated before anything is published, so a bad row leaves the registry as it was.
pub fn import_activities(
    registry: &ActivitySourceRegistry,
    csv_path: &Path,
) -> anyhow::Result<ImportSummary> {
    let reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open activities {}", csv_path.display()))?;
    let summary = activities_from_reader(registry, reader)?;
    info!(
        path = %csv_path.display(),
        students = summary.students,
        classes = summary.classes,
        tasks = summary.tasks,
        goals = summary.goals,
        "activities imported"
    );
    Ok(summary)
}

fn activities_from_reader<R: io::Read>(
    registry: &ActivitySourceRegistry,
    mut reader: csv::Reader<R>,
) -> anyhow::Result<ImportSummary> {
    #[derive(Deserialize)]
    struct ActivityRow {
        student_id: String,
        kind: String,
        detail: String,
        time: Option<String>,
    }

    let mut by_student: BTreeMap<String, StudentActivities> = BTreeMap::new();
    let mut summary = ImportSummary::default();

    for (index, result) in reader.deserialize::<ActivityRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("activities row {line}"))?;
        let activities = by_student
            .entry(row.student_id.trim().to_string())
            .or_default();

        match row.kind.trim().to_ascii_lowercase().as_str() {
            "class" => {
                let Some(time) = row.time.as_deref().filter(|t| !t.trim().is_empty()) else {
                    bail!("activities row {line}: class {:?} has no time", row.detail);
                };
                let entry = ScheduleEntry::parse(row.detail, time)
                    .with_context(|| format!("activities row {line}"))?;
                activities.schedule.get_or_insert_with(Vec::new).push(entry);
                summary.classes += 1;
            }
            "task" => {
                activities.tasks.get_or_insert_with(Vec::new).push(row.detail);
                summary.tasks += 1;
            }
            "goal" => {
                activities.goals.get_or_insert_with(Vec::new).push(row.detail);
                summary.goals += 1;
            }
            other => bail!("activities row {line}: unknown kind {other:?}"),
        }
    }

    summary.students = by_student.len();
    for (student_id, activities) in by_student {
        if let Some(schedule) = activities.schedule {
            registry.upsert_schedule(&student_id, schedule);
        }
        if let Some(tasks) = activities.tasks {
            registry.upsert_tasks(&student_id, tasks);
        }
        if let Some(goals) = activities.goals {
            registry.upsert_goals(&student_id, goals);
        }
    }

    Ok(summary)
}
