// Library for tests to access modules

pub mod config;
pub mod error;
pub mod feed;
pub mod mission_clock;
pub mod mission_phase;
pub mod models;
pub mod routes;
pub mod simulator;
pub mod version;
pub mod worker;
