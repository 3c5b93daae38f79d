pub mod check;
pub mod config;
pub mod render;
pub mod scan;
