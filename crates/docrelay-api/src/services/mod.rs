pub mod aggregate;
pub mod dispatch;
pub mod envelope;

pub use aggregate::Aggregator;
pub use dispatch::Dispatcher;
