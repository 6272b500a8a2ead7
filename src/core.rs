pub mod acceptance;
pub mod adjustment;
pub mod carbon;
pub mod cycle;
pub mod delays;
pub mod eligibility;
pub mod parameters;
pub mod rescheduling;
pub mod scenario;
pub mod window;
pub mod windows;
pub mod workload;
