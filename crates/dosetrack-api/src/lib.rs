pub mod auth;
pub mod emergency;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod profile;
pub mod resources;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
