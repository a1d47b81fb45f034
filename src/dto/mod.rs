pub mod calendar_dto;
pub mod directory_dto;
pub mod hiring_dto;
pub mod meeting_dto;
pub mod notification_dto;
