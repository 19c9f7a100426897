pub mod app;
pub mod jobs;
pub mod modules;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;
