pub mod catalog;
pub mod lookup;
pub mod query;
