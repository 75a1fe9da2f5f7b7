/**
 * Node directory: which federation nodes a request
 *  may span, in the fixed order they are concatenated.
 */
pub mod directory;
/**
 * The federated windowed-pagination engine.
 *  Plans per-source sub-windows over the virtual
 *  concatenation `local ++ remote_1 ++ ... ++ remote_n`
 *  and merges the results into a single page.
 */
pub mod federation;
/**
 * Wire models for tools, allocations and deployments.
 */
pub mod models;
/**
 * Page envelope and next/prev link computation.
 */
pub mod page;
/**
 * Resource kinds served by the gateway.
 */
pub mod resource;
/**
 * Backend-agnostic keyed store for owned records
 *  (allocations, deployments) plus an in-memory backend.
 */
pub mod store;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;
/**
 * Window request validation.
 */
pub mod window;

pub mod prelude {
    pub use crate::directory::{Node, NodeDirectory, StaticDirectory};
    pub use crate::federation::{Aggregate, Aggregator, Slice, Source, SourceError};
    pub use crate::models::{AllocationInfo, DeploymentInfo, ToolInfo};
    pub use crate::page::{Page, PageBuilder};
    pub use crate::resource::{Resource, ResourceKind};
    pub use crate::store::{Collection, Record, RecordStore, StoreError};
    pub use crate::version::build_info;
    pub use crate::window::{WindowError, WindowRequest};
}
