pub mod booking_rules;
pub mod booking_service;
pub mod convert;
pub mod item_service;
pub mod request_service;
pub mod user_service;
