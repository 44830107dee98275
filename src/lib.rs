pub mod command;
pub mod controllers;
pub mod error;
pub mod lesson;
pub mod models;
pub mod scheduler;
pub mod sim;
pub mod state;

pub use error::SimError;
pub use lesson::{Lesson, Sandbox};
pub use sim::Simulation;
pub use state::{ClusterState, FailureRules};
