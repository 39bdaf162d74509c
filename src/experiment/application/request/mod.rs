pub mod availability_query;
pub mod submission_request;
