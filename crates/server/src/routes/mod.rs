//! Route handlers.

pub mod api;
pub mod health;
pub mod home;
pub mod submit;

use serde::Deserialize;

/// Query string of the lookup routes. `query` stays `None` when the parameter
/// is absent and is `Some("")` when it is present but empty.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}
