//! Fixture services: token classification, account provisioning, and
//! fillable order construction.

pub mod fill;
pub mod provision;
pub mod token;

pub use fill::{FillScenarios, FillableOrderRequest};
pub use provision::Provisioner;
pub use token::TokenClassifier;
