pub mod checkin;
pub mod report_headers;
pub mod submit_analysis;
pub mod submit_error;
pub mod submit_report;
pub mod submit_sample;
pub mod testauth;
