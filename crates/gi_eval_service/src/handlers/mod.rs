pub mod checkin;
pub mod info;
pub mod reanalyze;
pub mod submit;
pub mod testauth;
pub mod update;
