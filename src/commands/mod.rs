pub mod daemon;
pub mod pick;
pub mod present;
pub mod resolve;
pub mod send;
pub mod slides;
pub mod utils;

#[cfg(test)]
#[path = "../commands_test.rs"]
mod commands_test;
