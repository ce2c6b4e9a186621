pub mod ai;
pub mod calculators;
pub mod commands;
pub mod engine;
pub mod runner;
pub mod scoring;
pub mod state;
pub mod status;

#[cfg(test)]
pub(crate) mod tests;
