pub mod descriptor;
pub mod engine;
pub mod plan;

pub use crate::domain::model::{Artifact, ModuleDescriptor, PublicationPlan, TestReport};
pub use crate::domain::ports::{Compiler, DependencyResolver, Publisher, TestRunner};
pub use crate::utils::error::Result;
