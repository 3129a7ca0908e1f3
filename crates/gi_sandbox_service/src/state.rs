use std::sync::Arc;

use gi_db::DbPool;
use gi_hypervisor::VmTaskPool;
use gi_protocol::Config;

/// Process-wide state for the Sandbox Service, built once at startup
/// (spec §9: "Database handle, hypervisor driver ... each initialized
/// once at process start").
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub task_pool: Arc<VmTaskPool>,
}
