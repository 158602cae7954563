// Library for tests to access modules

pub mod actions;
pub mod broadcaster;
pub mod config;
pub mod forwarder;
pub mod models;
pub mod report_repo;
pub mod routes;
pub mod runner;
pub mod scan;
pub mod scoring;
pub mod telemetry;
pub mod version;
