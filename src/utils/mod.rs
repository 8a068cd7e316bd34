pub mod availability;
pub mod pagination;
