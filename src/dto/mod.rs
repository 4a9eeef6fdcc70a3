pub mod quiz_dto;
pub mod similarity_dto;
