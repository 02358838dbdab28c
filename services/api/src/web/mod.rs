pub mod applications;
pub mod auth;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod students;
pub mod token;

// Re-export the pieces the server binary wires together.
pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;
