mod http_client;
mod proxy;
mod resilient_transport;
mod retry_policy;
mod retry_state;
mod sleeper;
mod transport_error;

pub use http_client::*;
pub use proxy::*;
pub use resilient_transport::*;
pub use retry_policy::*;
pub use sleeper::*;
pub use transport_error::*;

#[cfg(test)]
#[path = "./transport_test.rs"]
mod transport_test;
