use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::attendance::Ledger;
use crate::models::{ClassPresence, StudentCheckIns};
use crate::registry::Catalogs;

fn buckets<'a>(
    ledger: &'a Ledger,
    class_filter: Option<&'a str>,
) -> impl Iterator<Item = (&'a str, &'a str, &'a [NaiveDateTime])> + 'a {
    ledger.iter().flat_map(move |(student_id, classes)| {
        classes
            .iter()
            .filter(move |(class_id, stamps)| {
                !stamps.is_empty()
                    && class_filter.map_or(true, |filter| filter == class_id.as_str())
            })
            .map(move |(class_id, stamps)| {
                (student_id.as_str(), class_id.as_str(), stamps.as_slice())
            })
    })
}

pub fn summarize_by_class(ledger: &Ledger, class_filter: Option<&str>) -> Vec<ClassPresence> {
    let mut map: HashMap<&str, (usize, usize)> = HashMap::new();

    for (_, class_id, stamps) in buckets(ledger, class_filter) {
        let entry = map.entry(class_id).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += stamps.len();
    }

    let mut summaries: Vec<ClassPresence> = map
        .into_iter()
        .map(|(class_id, (student_count, check_ins))| ClassPresence {
            class_id: class_id.to_string(),
            student_count,
            check_ins,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.student_count
            .cmp(&a.student_count)
            .then_with(|| a.class_id.cmp(&b.class_id))
    });
    summaries
}

pub fn summarize_by_student(ledger: &Ledger, class_filter: Option<&str>) -> Vec<StudentCheckIns> {
    let mut map: HashMap<&str, StudentCheckIns> = HashMap::new();

    for (student_id, _, stamps) in buckets(ledger, class_filter) {
        let entry = map.entry(student_id).or_insert_with(|| StudentCheckIns {
            student_id: student_id.to_string(),
            class_count: 0,
            check_ins: 0,
            last_seen: None,
        });
        entry.class_count += 1;
        entry.check_ins += stamps.len();
        entry.last_seen = entry.last_seen.max(stamps.iter().max().copied());
    }

    let mut values: Vec<StudentCheckIns> = map.into_values().collect();
    values.sort_by(|a, b| {
        b.check_ins
            .cmp(&a.check_ins)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    values
}

pub fn build_report(
    class_filter: Option<&str>,
    generated_at: NaiveDateTime,
    ledger: &Ledger,
    catalogs: &Catalogs,
) -> String {
    let classes = summarize_by_class(ledger, class_filter);
    let students = summarize_by_student(ledger, class_filter);

    let mut output = String::new();
    let class_label = class_filter.unwrap_or("all classes");

    let _ = writeln!(output, "# Attendance Report");
    let _ = writeln!(
        output,
        "Generated for {} at {}",
        class_label,
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Class Presence");

    if classes.is_empty() {
        let _ = writeln!(output, "No check-ins recorded.");
    } else {
        for class in classes.iter() {
            let _ = writeln!(
                output,
                "- {}: {} students present ({} check-ins)",
                class.class_id, class.student_count, class.check_ins
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Student Check-ins");

    if students.is_empty() {
        let _ = writeln!(output, "No students have checked in.");
    } else {
        for student in students.iter() {
            let last_seen = student
                .last_seen
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string());
            let _ = writeln!(
                output,
                "- {}: {} check-ins across {} classes, last seen {}",
                student.student_id, student.check_ins, student.class_count, last_seen
            );
        }
    }

    let absent: Vec<String> = catalogs
        .students()
        .into_iter()
        .filter(|student_id| !students.iter().any(|s| &s.student_id == student_id))
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Not Yet Checked In");

    if absent.is_empty() {
        let _ = writeln!(output, "Every known student has checked in.");
    } else {
        for student_id in absent.iter() {
            let _ = writeln!(output, "- {}", student_id);
        }
    }

    let mut recent: Vec<(&str, &str, NaiveDateTime)> = buckets(ledger, class_filter)
        .flat_map(|(student_id, class_id, stamps)| {
            stamps.iter().map(move |at| (student_id, class_id, *at))
        })
        .collect();
    recent.sort_by(|a, b| b.2.cmp(&a.2));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Check-ins");

    if recent.is_empty() {
        let _ = writeln!(output, "No check-ins recorded.");
    } else {
        for (student_id, class_id, at) in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} in {} at {}",
                student_id,
                class_id,
                at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    output
}
