pub mod clock;
pub mod config;
pub mod display;
pub mod endpoint;
pub mod errors;
mod handlers;
pub mod ids;
mod locations;
pub mod log;
pub mod notify;
pub mod objects;
pub mod paths;
pub mod records;
mod routes;
pub mod server;
pub mod store;
