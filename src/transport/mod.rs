pub mod discovery;
pub mod error;
pub mod link;
pub mod selection;
