#![doc = "The `pathforge` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, repository interfaces and their"]
#![doc = "PostgreSQL/in-memory implementations, the domain services, authentication"]
#![doc = "mechanisms, routing configuration, and error handling for the Pathforge"]
#![doc = "application. It is used by the main binary (`main.rs`) to construct and"]
#![doc = "run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod routes;
pub mod services;
pub mod state;
