pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod report;
pub mod seed;
pub mod store;

pub use api::handlers;
pub use api::routes;

pub use model::*;

pub use report::{ReportError, ReportService};

pub use seed::*;

pub use store::{BlobStore, FsBlobStore, MemoryStore, PostgresStore, RecordStore, Store, StoreBundle};
