//! Enroll Core — multi-step signup flows for the hospital platform clients.

pub mod api;
pub mod assembler;
pub mod capability;
pub mod config;
pub mod error;
pub mod flows;
pub mod guard;
pub mod schema;
pub mod session;
pub mod store;
pub mod validator;
