pub mod category;
pub mod classification;
pub mod job_posting;
pub mod resume;
pub mod user;
