pub mod marathon;
pub mod memory;
pub mod microbadger;
pub mod payload;
pub mod web;
