//! Wires `gi_db::analyses` into the generic [`gi_hypervisor::watchdog`],
//! mirroring `gi_eval_service::reclaim` for the Analysis VM pool.

use async_trait::async_trait;
use std::time::Duration;

use gi_db::models::Analysis;
use gi_db::DbPool;
use gi_hypervisor::{ReclaimableRow, StaleRowStore};

impl ReclaimableRow for Analysis {
    fn vm_name(&self) -> Option<&str> {
        self.analysis_vm.as_deref()
    }
}

pub struct AnalysisStore {
    pub pool: DbPool,
}

#[async_trait]
impl StaleRowStore<Analysis> for AnalysisStore {
    async fn find_stale(&self, timeout: Duration) -> anyhow::Result<Vec<Analysis>> {
        Ok(gi_db::analyses::find_stale_running(&self.pool, timeout).await?)
    }

    async fn mark_error(&self, row: &Analysis, message: &str) -> anyhow::Result<()> {
        gi_db::analyses::finish(&self.pool, row.id, gi_protocol::status::AnalysisStatus::Error.as_i32(), Some(message))
            .await?;
        Ok(())
    }
}
