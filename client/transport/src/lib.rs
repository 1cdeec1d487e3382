pub mod client;
pub mod mock;

pub use client::{decode, HttpTransport, Transport};
pub use mock::MockTransport;
