//! HTTP API module for the Voucher Benefit Engine.
//!
//! `POST /runs` accepts the source tables inline and runs the whole
//! pipeline over them; `GET /health` answers liveness probes.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{RunRequest, TablePayload};
pub use response::{ApiError, ApiErrorResponse, RunResponse};
pub use state::AppState;
