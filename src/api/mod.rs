//! Client side of the pet service
//!
//! This module provides:
//! - The `Transport` seam with a reqwest implementation and a scripted mock
//! - `RemoteResponse` accessors for the step-specific payload fields
//! - Error normalization into a single network error kind

pub mod error;
pub mod mock;
pub mod response;
pub mod transport;

pub use error::TransportError;
pub use mock::MockTransport;
pub use response::{PetSummary, RemoteResponse, UserInfo};
pub use transport::{HttpTransport, Method, Request, Transport};
