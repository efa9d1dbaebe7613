pub mod aggregator;
pub mod domain;
pub mod funding;
pub mod pipeline;
pub mod profiles;
pub mod publisher;
pub mod report;
pub mod sanitize;
pub mod sources;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
