//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, binary only)
//! 2. CORS
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Rate limiting on the contact routes (binary only)

pub mod cors;
pub mod rate_limit;
pub mod request_id;

pub use cors::cors_layer;
pub use rate_limit::{RateLimiterLayer, contact_rate_limiter};
pub use request_id::request_id_middleware;
