//! Public types for the Huginn API.

mod capability;
mod request;
mod response;

pub use capability::Capability;
pub use request::Request;
pub use response::Response;
