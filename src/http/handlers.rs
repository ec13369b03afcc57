use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Local, NaiveDateTime, SubsecRound};
use tracing::{info, warn};

use super::dto::{
    HealthResponse, PresenceResponse, RecordAttendanceRequest, RecordAttendanceResponse,
    ScheduleEntryDto, UpdateDataRequest, UpdateDataResponse, UpsertResponse, PRESENT,
};
use super::error::{AppError, AppJson};
use super::state::AppState;
use crate::error::CoreResult;
use crate::models::{RoutineItem, ScheduleEntry};
use crate::routine;

pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /
pub async fn index() -> &'static str {
    "The attendance backend is running!"
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        students: state.registry.students().len(),
        checked_in_students: state.attendance.checked_in_students(),
    })
}

// =============================================================================
// Attendance
// =============================================================================

/// POST /attendance
///
/// Stamps the check-in with the server's local time, to the second.
pub async fn record_attendance(
    State(state): State<AppState>,
    AppJson(request): AppJson<RecordAttendanceRequest>,
) -> HandlerResult<RecordAttendanceResponse> {
    let timestamp = Local::now().naive_local().trunc_subsecs(0);
    let event = state
        .attendance
        .record(&request.student_id, &request.class_id, timestamp);
    info!(
        student_id = %event.student_id,
        class_id = %event.class_id,
        "attendance recorded"
    );

    Ok(Json(RecordAttendanceResponse {
        message: format!(
            "Attendance marked for Student {} in Class {} at {}",
            event.student_id,
            event.class_id,
            event.timestamp.format("%Y-%m-%d %H:%M:%S")
        ),
        event,
    }))
}

/// GET /attendance/{student_id}
///
/// Class id to check-in timestamps. Empty for a student who never checked in.
pub async fn get_attendance_history(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> HandlerResult<BTreeMap<String, Vec<NaiveDateTime>>> {
    Ok(Json(state.attendance.history(&student_id)))
}

/// GET /realtime_attendance/{class_id}
pub async fn get_presence(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> HandlerResult<PresenceResponse> {
    let present = state
        .attendance
        .present_students(&class_id)
        .into_iter()
        .map(|student_id| (student_id, PRESENT.to_string()))
        .collect();
    Ok(Json(present))
}

// =============================================================================
// Catalogs
// =============================================================================

/// GET /schedule/{student_id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> HandlerResult<Vec<ScheduleEntry>> {
    let schedule = state.registry.schedule_for(&student_id);
    if schedule.is_empty() {
        return Err(AppError::NotFound("Student schedule not found.".to_string()));
    }
    Ok(Json(schedule))
}

/// PUT /schedule/{student_id}
///
/// Rejects the whole schedule if any time is malformed.
pub async fn put_schedule(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    AppJson(entries): AppJson<Vec<ScheduleEntryDto>>,
) -> HandlerResult<UpsertResponse> {
    let schedule = entries
        .into_iter()
        .map(ScheduleEntry::try_from)
        .collect::<CoreResult<Vec<_>>>()
        .inspect_err(|err| warn!(%student_id, error = %err, "schedule rejected"))?;

    let count = schedule.len();
    state.registry.upsert_schedule(&student_id, schedule);
    info!(%student_id, count, "schedule replaced");
    Ok(Json(UpsertResponse { student_id, count }))
}

/// GET /tasks/{student_id}
pub async fn get_tasks(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> HandlerResult<Vec<String>> {
    let tasks = state.registry.tasks_for(&student_id);
    if tasks.is_empty() {
        return Err(AppError::NotFound(
            "No personalized tasks found for this student.".to_string(),
        ));
    }
    Ok(Json(tasks))
}

/// PUT /tasks/{student_id}
pub async fn put_tasks(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    AppJson(tasks): AppJson<Vec<String>>,
) -> HandlerResult<UpsertResponse> {
    let count = tasks.len();
    state.registry.upsert_tasks(&student_id, tasks);
    info!(%student_id, count, "tasks replaced");
    Ok(Json(UpsertResponse { student_id, count }))
}

/// GET /goals/{student_id}
pub async fn get_goals(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> HandlerResult<Vec<String>> {
    let goals = state.registry.goals_for(&student_id);
    if goals.is_empty() {
        return Err(AppError::NotFound(
            "No long-term goals found for this student.".to_string(),
        ));
    }
    Ok(Json(goals))
}

/// PUT /goals/{student_id}
pub async fn put_goals(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    AppJson(goals): AppJson<Vec<String>>,
) -> HandlerResult<UpsertResponse> {
    let count = goals.len();
    state.registry.upsert_goals(&student_id, goals);
    info!(%student_id, count, "goals replaced");
    Ok(Json(UpsertResponse { student_id, count }))
}

/// POST /update_data
pub async fn update_data(
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateDataRequest>,
) -> HandlerResult<UpdateDataResponse> {
    let enrolled = state.registry.enroll_students(request.students.keys());
    info!(
        students = request.students.len(),
        courses = request.courses.len(),
        enrolled = enrolled.len(),
        "roster update received"
    );

    Ok(Json(UpdateDataResponse {
        message: "Data updated successfully on the backend.".to_string(),
        enrolled,
    }))
}

// =============================================================================
// Routine
// =============================================================================

/// GET /daily_routine/{student_id}
pub async fn get_daily_routine(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> HandlerResult<Vec<RoutineItem>> {
    Ok(Json(routine::daily_routine(&state.registry, &student_id)))
}
