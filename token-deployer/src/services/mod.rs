pub mod deployments;
pub mod state;
