//! Events domain actions - business logic functions
//!
//! Every public action takes an explicit `Actor` (except the ingestion gate,
//! which is internal) and the shared `ServerDeps`.

pub mod catalogue;
pub mod ingest;
pub mod moderation;
pub mod scan;
pub mod submissions;

pub use catalogue::*;
pub use ingest::*;
pub use moderation::*;
pub use scan::*;
pub use submissions::*;
