pub mod advisory;
pub mod alerting;
pub mod geo;
pub mod lifecycle;
pub mod models;
pub mod session;
