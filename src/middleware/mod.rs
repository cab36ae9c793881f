pub mod cors;
pub mod gate;
pub mod response;

pub use cors::{cors_middleware, CorsPolicy};
pub use gate::{request_gate, RequestGate, Verdict};
pub use response::{ApiResponse, ApiResult};
