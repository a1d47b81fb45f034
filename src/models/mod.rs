pub mod calendar_event;
pub mod department;
pub mod employee;
pub mod farmer;
pub mod hire;
pub mod job_posting;
pub mod meeting;
pub mod team;
