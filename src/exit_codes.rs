//! Exit code taxonomy: `0` pass, `1` policy/drift/report failure, `2`
//! configuration or fatal tool error.

use crate::error::AppError;

pub mod codes {
    pub const SUCCESS: i32 = 0;
    pub const REPORT_FAILURE: i32 = 1;
    pub const FATAL_ERROR: i32 = 2;
}

/// Maps a fatal [`AppError`] (one that aborted the command before a report
/// could be produced) to its exit code. Policy/drift failures that *do*
/// produce a report take the `1` path directly in the orchestrator rather
/// than through this function.
#[must_use]
pub fn fatal_error_exit_code(error: &AppError) -> i32 {
    match error {
        AppError::PolicyFailure(_) | AppError::DriftFailure(_) => codes::REPORT_FAILURE,
        _ => codes::FATAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_failure_exits_one() {
        assert_eq!(fatal_error_exit_code(&AppError::PolicyFailure("x".to_string())), codes::REPORT_FAILURE);
    }

    #[test]
    fn no_targets_exits_two() {
        assert_eq!(fatal_error_exit_code(&AppError::NoTargets), codes::FATAL_ERROR);
    }
}
