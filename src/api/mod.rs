//! HTTP layer for campus-bot.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /webhook` - Platform update ingestion (feeds the dispatcher)
//! - `POST /notify/{user_id}` - Free-form notification to one user
//! - `POST /notify/bulk` - Free-form notification to many users
//! - `POST /notify/ready/{user_id}` - Document-ready notice
//! - `POST /notify/payment/tuition/{user_id}` - Tuition payment reminder
//!
//! The notify endpoints are guarded by a bearer token when one is
//! configured; `/health` and `/webhook` are always open.

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::AppState;
pub use router::{create_router, HttpListener, ListenerConfig};
pub use types::{
    BulkNotifyRequest, BulkNotifyResponse, ErrorResponse, NotifyRequest, NotifyResponse,
};
