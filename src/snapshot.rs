use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::attendance::{AttendanceService, Ledger};
use crate::registry::{ActivitySourceRegistry, Catalogs};

/// On-disk copy of the service state. The ledger keeps its student → class → timestamps shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub attendance: Ledger,
    #[serde(default)]
    pub catalogs: Catalogs,
}

impl StateSnapshot {
    pub fn capture(attendance: &AttendanceService, registry: &ActivitySourceRegistry) -> Self {
        Self {
            attendance: attendance.ledger(),
            catalogs: Catalogs::clone(&registry.snapshot()),
        }
    }

    pub fn restore_into(self, attendance: &AttendanceService, registry: &ActivitySourceRegistry) {
        attendance.restore(self.attendance);
        registry.replace(self.catalogs);
    }
}

/// Reads a snapshot, or `None` when the file does not exist yet.
pub fn load(path: &Path) -> anyhow::Result<Option<StateSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = serde_json::from_slice(&raw)
        .with_context(|| format!("snapshot {} is not valid", path.display()))?;
    Ok(Some(snapshot))
}

/// Writes to a sibling temp file first so a crash never leaves a truncated snapshot.
pub fn save(path: &Path, snapshot: &StateSnapshot) -> anyhow::Result<()> {
    let tmp = temp_path(path);
    let raw = serde_json::to_vec_pretty(snapshot)?;
    std::fs::write(&tmp, raw)
        .with_context(|| format!("failed to write snapshot {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move snapshot into {}", path.display()))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
