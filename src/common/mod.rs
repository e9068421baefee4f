pub mod error;
pub mod paging;
