pub mod config;
pub mod fetch;
pub mod model;
pub mod roster;
pub mod strategy;
