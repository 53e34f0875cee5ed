//! Requests forwarded to a backend on behalf of a session.
//!
//! The dispatch layer classifies each request by HTTP method and logical
//! type. Only session-creation requests are rewritten; [`RequestMutator`]
//! injects the provider credentials into their capability document and
//! hands every other request back untouched.

mod mutator;
mod request;

pub use mutator::{DESIRED_CAPABILITIES, RequestMutationError, RequestMutator};
pub use request::{ForwardedRequest, HttpMethod, ParseHttpMethodError, RequestType};

#[cfg(test)]
mod tests;
