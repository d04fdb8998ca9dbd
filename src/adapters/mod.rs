// Adapters layer: concrete collaborator implementations behind the domain
// ports (compiler command, HTTP dependency resolver, local repository
// publisher, test harness).

pub mod compiler;
pub mod publisher;
pub mod resolver;
pub mod test_runner;

pub use compiler::CommandCompiler;
pub use publisher::LocalRepositoryPublisher;
pub use resolver::{HttpResolver, RepositoryLocation};
pub use test_runner::CommandTestRunner;
