pub mod config;
pub mod doctor;
pub mod predict;
pub mod serve;
