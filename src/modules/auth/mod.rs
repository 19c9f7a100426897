pub mod flow;
pub mod repository;
pub mod routes;
pub mod service;
