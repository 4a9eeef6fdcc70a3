pub mod ai_service;
pub mod attempt_service;
pub mod grading_service;
pub mod quiz_service;
pub mod search_service;
pub mod similarity_service;
