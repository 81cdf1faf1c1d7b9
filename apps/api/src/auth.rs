mod oauth;
mod session;

pub use oauth::{oauth_callback_handler, oauth_start_handler};
pub use session::{logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
/// Pending OAuth `(provider, state)` pair awaiting its callback.
pub(super) const SESSION_OAUTH_STATE_KEY: &str = "oauth_state";
