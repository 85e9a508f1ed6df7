//! Interactive session: credentials, fetched collections, drill-down state.

pub mod controller;
pub mod credentials;
pub mod snapshot;

pub use controller::{ResourceKind, ResourceState, Selection, Session, SessionOptions};
pub use credentials::Credentials;
pub use snapshot::SessionSnapshot;
