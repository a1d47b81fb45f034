pub mod backend_client;
pub mod calendar_adapter;
pub mod calendar_service;
pub mod directory_service;
pub mod event_form;
pub mod event_store;
pub mod hire_wizard;
pub mod hiring_service;
pub mod meeting_service;
pub mod meeting_status;
pub mod reminder_service;
