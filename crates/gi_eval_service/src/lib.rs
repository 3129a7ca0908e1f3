//! Evaluation Service (spec §4.1): owns the Candidate queue, the Build
//! VM checkin/update protocol, and the build-VM stale-row watchdog.

pub mod app;
pub mod auth;
pub mod handlers;
pub mod reclaim;
pub mod state;
pub mod state_machine;

pub use app::router;
pub use state::AppState;
