pub mod age;
pub mod form;
pub mod job;
pub mod view;

pub use age::relative_age;
pub use form::{build_submission, JobForm};
pub use job::{Job, JobId, JobPayload, JobType};
pub use view::{FetchTicket, JobListViewModel, SortOrder};

/// Message shown in place of the list when nothing matches.
pub const NO_RESULTS: &str = "No jobs found matching your criteria";
