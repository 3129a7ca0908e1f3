//! Wires `gi_db::candidates` into the generic
//! [`gi_hypervisor::watchdog`] so the Build-VM pool gets reclaimed from
//! a stalled `building` row the same way the Sandbox Service reclaims
//! stalled Analyses.

use async_trait::async_trait;
use std::time::Duration;

use gi_db::models::Candidate;
use gi_db::DbPool;
use gi_hypervisor::{ReclaimableRow, StaleRowStore};

impl ReclaimableRow for Candidate {
    fn vm_name(&self) -> Option<&str> {
        self.build_vm.as_deref()
    }
}

pub struct CandidateStore {
    pub pool: DbPool,
}

#[async_trait]
impl StaleRowStore<Candidate> for CandidateStore {
    async fn find_stale(&self, timeout: Duration) -> anyhow::Result<Vec<Candidate>> {
        Ok(gi_db::candidates::find_stale_building(&self.pool, timeout).await?)
    }

    async fn mark_error(&self, row: &Candidate, message: &str) -> anyhow::Result<()> {
        let update = gi_db::candidates::CandidateUpdate {
            status: Some(gi_protocol::status::CandidateStatus::Error.as_i32()),
            error_message: Some(message.to_string()),
            ..Default::default()
        };
        gi_db::candidates::apply_update(&self.pool, &row.hash, update).await?;
        Ok(())
    }
}
