//! Built-in component descriptors, one module per domain.

pub mod demo;
pub mod http;
pub mod introduction;
pub mod logger;
pub mod mqtt;
pub mod mqtt_eventstream;
pub mod recorder;
