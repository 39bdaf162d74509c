pub mod availability_service;
pub mod results_service;
pub mod submission_service;
