//! Service discovery and ecosystem classification

pub mod discovery;
pub mod ecosystem;

pub use discovery::{discover_services, ServiceDirectory};
pub use ecosystem::{classify, EcosystemKind, MarkerFile};
