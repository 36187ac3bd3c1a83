//! Request and response types for the routing service.

mod request;
mod response;

pub use request::{
    CostFactors, DebugFlags, Profile, RequestBuilder, RequestError, SearchRequest,
    TuningParameters,
};
pub use response::{IterationResult, SearchResponse};
