// Request identity
// Decision: The owner identity is a UUID in the X-User-Id header.
// Login, tokens and passwords are handled outside this service.

pub mod middleware;

pub use middleware::{AuthError, AuthUser, USER_ID_HEADER};
