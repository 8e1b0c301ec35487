pub mod store;

pub use store::{DeploymentState, DeploymentStore};
