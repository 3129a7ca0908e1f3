//! Sandbox Service (spec §4.2): owns Sample and Analysis records, the
//! encrypted sample store, and the Analysis VM checkin/report protocol.

pub mod app;
pub mod auth;
pub mod handlers;
pub mod reclaim;
pub mod state;
pub mod state_machine;

pub use app::router;
pub use state::AppState;
