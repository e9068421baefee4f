pub mod auth;
pub mod board;
pub mod branches;
pub mod customers;
pub mod landing;
pub mod notices;
pub mod sms;
pub mod stats;
pub mod templates;
