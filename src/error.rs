/// Errors raised by the attendance and routine core.
///
/// Lookups of unknown students or classes are not errors; they yield empty results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Provisioned data that cannot be accepted, such as a schedule time that is not `H:MM AM/PM`.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl CoreError {
    pub fn invalid_input(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidInput {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
