mod auth;
mod health_check;

pub use auth::{list_users, log_out, me, refresh_token, sign_in, sign_up};
pub use health_check::health_check;
