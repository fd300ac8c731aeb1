//! Cross-crate tests: several replicas of one comment forest talking through
//! the mock hub

mod convergence;
mod fuzz;
