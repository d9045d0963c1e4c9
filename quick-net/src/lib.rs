// quick-net/src/lib.rs
pub mod http;
pub mod validation;

pub use http::{HttpTransport, ProgressFn, Transport};
pub use validation::validate_url;
