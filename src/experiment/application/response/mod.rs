pub(crate) mod schedules_response;
pub(crate) mod submission_response;
