//! Observable facade around at most one running bulk leak check batch.

mod service;

pub use service::{BulkLeakCheckService, Observer, State};
