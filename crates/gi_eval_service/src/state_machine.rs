//! The single guarded entry point for every Candidate status change
//! (spec §4.1 state machine, §9: "all transitions routed through one
//! guarded function so that `TransitionError` is the sole entry for
//! invalid moves").

use gi_protocol::status::CandidateStatus;
use gi_protocol::ApiError;

/// Is `from -> to` one of the legal edges in the Candidate state
/// machine (spec §4.1 table)? `reanalyze` (terminal -> pending) is
/// handled by its own endpoint, not through `/vm/update`, so it is
/// intentionally excluded here.
fn is_legal_edge(from: CandidateStatus, to: CandidateStatus) -> bool {
    use CandidateStatus::*;
    matches!(
        (from, to),
        (Pending, Building)
            | (Building, Analyzing)
            | (Building, Complete)
            | (Building, Error)
            | (Analyzing, Complete)
            | (Analyzing, Error)
    )
}

/// Validate a `/vm/update` request against the current row status.
///
/// - Terminal writes are total (spec §5): once `complete`/`error`, any
///   further update — including a late update carrying no explicit
///   `status` — is rejected.
/// - A data-only update (no `status` field) is legal while the row is
///   non-terminal; it leaves the status unchanged.
/// - An explicit `status` must name a legal outgoing edge from the
///   current status.
pub fn validate_update(
    current: CandidateStatus,
    requested: Option<CandidateStatus>,
) -> Result<CandidateStatus, ApiError> {
    if current.is_terminal() {
        return Err(ApiError::Transition(format!(
            "candidate already terminal ({current}), update rejected"
        )));
    }

    match requested {
        None => Ok(current),
        Some(to) if is_legal_edge(current, to) => Ok(to),
        Some(to) => Err(ApiError::Transition(format!(
            "illegal candidate transition {current} -> {to}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CandidateStatus::*;

    #[test]
    fn building_to_analyzing_is_legal() {
        assert_eq!(validate_update(Building, Some(Analyzing)).unwrap(), Analyzing);
    }

    #[test]
    fn building_to_pending_is_illegal() {
        assert!(validate_update(Building, Some(Pending)).is_err());
    }

    #[test]
    fn analyzing_to_building_is_illegal() {
        assert!(validate_update(Analyzing, Some(Building)).is_err());
    }

    #[test]
    fn terminal_rows_reject_any_update() {
        assert!(validate_update(Complete, None).is_err());
        assert!(validate_update(Error, Some(Complete)).is_err());
    }

    #[test]
    fn data_only_update_keeps_current_status() {
        assert_eq!(validate_update(Building, None).unwrap(), Building);
    }
}
