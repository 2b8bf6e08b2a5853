//! Wire-level record types shared by every consumer of the CRM backend.

pub mod instance;
pub mod model;
pub mod report;

pub use instance::Instance;
pub use model::ModelDescriptor;
pub use report::{Report, ResultSet};
