//! Container image build/test/push orchestration.
//!
//! - `registry` - the read-only table of image names and source URLs
//! - `resolver` - turns the configuration string into an ordered build plan
//! - `script` - typed remote command plan and its shell renderer
//! - `orchestrator` - plan assembly and the single remote invocation

pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod script;

pub use orchestrator::{normalize_registry, orchestrate, ImagesStep, OrchestrateResult};
pub use registry::ImageRegistry;
pub use resolver::{resolve, BuildPlan, ImageSpec};
