//! Request orchestration

mod builder;
mod dispatch;
mod handle;

pub use builder::OrchestratorBuilder;
pub use dispatch::RequestOrchestrator;
pub use handle::DispatchHandle;
