pub mod audit_logs;
pub mod bookings;
pub mod comments;
pub mod item_requests;
pub mod items;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use bookings::Entity as Bookings;
pub use comments::Entity as Comments;
pub use item_requests::Entity as ItemRequests;
pub use items::Entity as Items;
pub use users::Entity as Users;
