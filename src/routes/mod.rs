pub mod calendar;
pub mod directory;
pub mod health;
pub mod hiring;
pub mod meetings;
pub mod notifications;
