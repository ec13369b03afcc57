use std::sync::Arc;

use crate::attendance::AttendanceService;
use crate::registry::ActivitySourceRegistry;

/// Shared handles passed to every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub attendance: Arc<AttendanceService>,
    pub registry: Arc<ActivitySourceRegistry>,
}

impl AppState {
    pub fn new(attendance: Arc<AttendanceService>, registry: Arc<ActivitySourceRegistry>) -> Self {
        Self {
            attendance,
            registry,
        }
    }
}
