use std::sync::Arc;

use gi_db::DbPool;
use gi_hypervisor::VmTaskPool;
use gi_protocol::Config;

/// Process-wide state, built once at startup and shared by reference
/// into every handler (spec §9: "Database handle, hypervisor driver,
/// and classifier model are each initialized once at process start").
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub task_pool: Arc<VmTaskPool>,
}
