// Professor Planner Control Plane Library
// Decision: Shared library for binaries (API server, OpenAPI export) and API tests

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Caller identity extraction
pub mod auth;

// Environment configuration
pub mod config;

// Reminder mail transports
pub mod mailer;

// Services layer
pub mod services;
pub use services::{EventService, ServiceError, UserService};

// Storage layer
pub mod storage;

// OpenAPI spec generation
pub mod openapi;
