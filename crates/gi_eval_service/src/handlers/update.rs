use axum::extract::State;
use axum::Json;

use gi_db::candidates::CandidateUpdate;
use gi_protocol::dto::VmUpdateRequest;
use gi_protocol::fitness::{compile_quality, count_diagnostics, test_pass_rate};
use gi_protocol::status::CandidateStatus;
use gi_protocol::ApiError;

use crate::state::AppState;
use crate::state_machine::validate_update;

/// `POST /vm/update` (spec §4.1): the Build VM's sole write path while a
/// Candidate is `building`. Accepts either precomputed `f1`/`f2` or the
/// raw signals (`build_output`, `num_tests`/`num_passed`) and derives
/// the score itself via [`gi_protocol::fitness`], so a simple agent only
/// has to forward compiler output and a test summary.
pub async fn update(State(state): State<AppState>, Json(req): Json<VmUpdateRequest>) -> Result<(), ApiError> {
    let candidate = gi_db::candidates::get_by_hash(&state.pool, &req.hash)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .ok_or_else(|| ApiError::NotFound(format!("candidate {}", req.hash)))?;

    let current = candidate
        .status()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

    let requested = req
        .status
        .map(CandidateStatus::try_from)
        .transpose()
        .map_err(|e| ApiError::Client(format!("invalid status code: {e}")))?;

    let requested = resolve_requested_status(requested, req.no_binary);

    let new_status = validate_update(current, requested)?;

    let f1 = match (req.f1, &req.build_output, req.no_binary) {
        (Some(f1), _, _) => Some(f1),
        (None, Some(output), _) => {
            let (errors, warnings) = count_diagnostics(output);
            Some(compile_quality(errors, warnings))
        }
        (None, None, Some(true)) => Some(0.0),
        (None, None, _) => None,
    };

    // `status ∈ {complete, error}` reached directly from `building` (no
    // binary produced, or an outright build error) skips the test stage
    // entirely; ES fills F2 itself rather than waiting on an agent that
    // will never call back with a test summary (spec §4.1 F1 policy,
    // invariant 4).
    let terminal_without_tests =
        req.no_binary == Some(true) || matches!(new_status, CandidateStatus::Complete | CandidateStatus::Error);
    let f2 = match (req.f2, req.num_tests) {
        (Some(f2), _) => Some(f2),
        (None, Some(num_tests)) => Some(test_pass_rate(num_tests, req.num_passed.unwrap_or(0))),
        (None, None) if terminal_without_tests && candidate.f2.is_none() => Some(0.0),
        (None, None) => None,
    };

    // A Candidate that reaches a terminal status without ever passing
    // through Analyzing never gets a behavioral score from the
    // Classification Scheduler; ES fills F3=0 itself so the row isn't
    // stuck permanently un-fuseable (spec §3 invariant 4, §4.1: "If
    // status ∈ {3,4} and F3 is absent and F3 currently null, set F3=0").
    let f3 = req.f3.or(
        if matches!(new_status, CandidateStatus::Complete | CandidateStatus::Error) && candidate.f3.is_none() {
            Some(0.0)
        } else {
            None
        },
    );

    let update = CandidateUpdate {
        status: Some(new_status.as_i32()),
        f1,
        f2,
        f3,
        analysis_id: req.analysis_id,
        error_message: req.error_message.clone(),
    };

    gi_db::candidates::apply_update(&state.pool, &req.hash, update)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    if let Some(analysis_id) = req.analysis_id {
        if let Some(analysis) = gi_db::analyses::get_by_id(&state.pool, analysis_id)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?
        {
            gi_db::candidates::associate_sample(&state.pool, &req.hash, &analysis.sample_sha256)
                .await
                .map_err(|e| ApiError::Internal(e.into()))?;
        }
    }

    // spec §9: "clean=true ⇒ no revert; otherwise always revert" — the
    // VM only gets a fresh snapshot when the calling agent didn't
    // already attest it is unmodified.
    if !req.clean.unwrap_or(false) {
        if let Some(vm) = candidate.build_vm.as_deref().and_then(|name| state.config.vm_by_name(name)) {
            state.task_pool.spawn_revert_then_start(vm.name.clone(), vm.snapshot.clone());
        }
    }

    Ok(())
}

/// spec §4.1 state table: "building | update(status=3) ∨ no-binary |
/// complete" — `no_binary=true` is itself a trigger for the
/// Building->Complete edge, not just a hint used while deriving F1/F2;
/// an agent that reports it without redundantly also setting `status: 3`
/// must still terminate the candidate. An explicit `status` always wins.
fn resolve_requested_status(requested: Option<CandidateStatus>, no_binary: Option<bool>) -> Option<CandidateStatus> {
    requested.or(if no_binary == Some(true) { Some(CandidateStatus::Complete) } else { None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_binary_alone_implies_complete() {
        assert_eq!(resolve_requested_status(None, Some(true)), Some(CandidateStatus::Complete));
    }

    #[test]
    fn explicit_status_wins_over_no_binary() {
        assert_eq!(
            resolve_requested_status(Some(CandidateStatus::Error), Some(true)),
            Some(CandidateStatus::Error)
        );
    }

    #[test]
    fn neither_field_set_leaves_status_untouched() {
        assert_eq!(resolve_requested_status(None, None), None);
    }

    #[test]
    fn no_binary_false_is_not_a_trigger() {
        assert_eq!(resolve_requested_status(None, Some(false)), None);
    }
}
