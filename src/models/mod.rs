pub mod grading;
pub mod question;
pub mod quiz;
pub mod quiz_attempt;
pub mod similarity_report;
pub mod submission;
