pub mod auth;
pub mod branch;
pub mod customer;
pub mod notice;
pub mod reservation;
pub mod stats;
pub mod template;
