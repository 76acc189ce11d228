pub mod config;
pub mod digest;
pub mod domain;
pub mod email_client;
pub mod event_source;
pub mod routes;
pub mod startup;
pub mod telemetry;
