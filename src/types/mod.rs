//! Public types for the Heimdallr API.

mod request;
mod response;

pub use request::{InferenceRequest, Principal, RawRequest};
pub use response::{CompletionResult, Outcome, StreamEvent};
