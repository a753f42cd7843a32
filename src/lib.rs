#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

//! Server side of the FIDO U2F challenge-response protocol.
//!
//! This crate generates registration and authentication challenges and
//! cryptographically verifies the responses produced by a physical security
//! key, binding every operation to a relying-party origin and application
//! identifier. Transport of the JSON messages and persistence of the
//! resulting [`Client`] credentials belong to the caller.
//!
//! # Lifecycle
//!
//! Call [`Server::start`] once per process before opening contexts, and
//! [`Server::stop`] only after every context is closed. Each [`Context`]
//! covers a single challenge/response pair; open a fresh one per operation.
//!
//! ```no_run
//! use u2f_server::{Mode, Server};
//!
//! # fn main() -> Result<(), u2f_server::U2fError> {
//! let server = Server::start(Mode::Production)?;
//!
//! let mut ctx = server.open();
//! let challenge = ctx.registration_challenge("https://example.com", "https://example.com")?;
//! // ... deliver `challenge` to the browser, receive the device response ...
//! # let response = String::new();
//! let client = ctx.registration_verify(&response)?;
//! server.close(ctx);
//!
//! // Persist `client`; later, authenticate against it:
//! let mut ctx = server.open();
//! let challenge = ctx.authentication_challenge("https://example.com", "https://example.com", &client)?;
//! # let response = String::new();
//! let (counter, user_present) = ctx.authentication_verify(&response)?;
//! server.close(ctx);
//! # let _ = (counter, user_present);
//! # Ok(())
//! # }
//! ```
//!
//! # Counters
//!
//! Each successful authentication returns the device's usage counter. The
//! crate does not keep state between operations, so rejecting counters that
//! are not strictly increasing (the clone-detection check) is the caller's
//! obligation.

/// Version of the u2f-server crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod authentication;
mod codec;
mod context;
mod crypto;
mod errors;
mod registration;
mod server;
mod types;

// Re-exports for public use
pub use context::Context;
pub use errors::U2fError;
pub use server::{Mode, Server};
pub use types::{
    AuthenticationChallenge, AuthenticationResponse, Client, RegistrationChallenge,
    RegistrationResponse, PUBLIC_KEY_LEN, U2F_VERSION,
};
