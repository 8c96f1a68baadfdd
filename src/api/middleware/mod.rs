//! Request middleware: request ids, access logging, error rendering, and the
//! three auth levels (optional viewer, signed-in user, admin).

mod auth;
mod error_handler;
mod logging;
mod request_id;

pub use auth::{AuthUser, MaybeAuthUser, admin_middleware, auth_middleware, optional_auth_middleware};
pub use error_handler::{error_to_code, error_to_status_code, global_error_handler};
pub use logging::logging_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
