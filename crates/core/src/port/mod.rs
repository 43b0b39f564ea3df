// Port Layer - Interfaces for external dependencies

pub mod forecast_backend;
pub mod id_provider; // For deterministic testing
pub mod object_storage;
pub mod push_transport;
pub mod session;
pub mod time_provider;

// Re-exports
pub use forecast_backend::ForecastBackend;
pub use id_provider::IdProvider;
pub use object_storage::ObjectStorage;
pub use push_transport::{PushChannel, PushTransport};
pub use session::{CookieSession, SessionProvider, StaticSession};
pub use time_provider::TimeProvider;
