pub mod cli;
pub mod config;
pub mod diversify;
pub mod presets;
pub mod recipe;
pub mod recommender;
pub mod scoring;
pub mod search;
pub mod session;
pub mod source;
