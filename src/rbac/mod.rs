pub mod catalog;
pub mod guard;
pub mod policy;
