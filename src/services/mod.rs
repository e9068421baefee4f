pub mod auth;
pub mod calendar;
pub mod kakao;
pub mod sms;
