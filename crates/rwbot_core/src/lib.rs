pub mod actions;
pub mod client;
pub mod config;
pub mod modify;
pub mod review;

#[cfg(test)]
pub(crate) mod testing;
