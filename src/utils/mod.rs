pub mod database;
pub mod validation;
