//! # Aliro (Local Biometric Authentication Core)
//!
//! `aliro` is the local authentication core of the Sentinela safety-incident
//! reporting application. It implements the device-side public-key credential
//! flow used by the lock screen: capability probing, credential enrollment,
//! challenge/response assertion, and the lock-screen state machine that
//! orchestrates them.
//!
//! ## Protocol phases
//!
//! 1. **Capability probe**: does this device expose a user-verifying
//!    platform authenticator in a secure context? Never errors; `false` is
//!    the answer to every degraded situation.
//! 2. **Enrollment**: creates a credential bound to a profile, returning an
//!    opaque credential id and public key encoded as text for storage.
//! 3. **Assertion**: requests a signed assertion against a previously
//!    stored credential id with a fresh 32-byte challenge per call.
//! 4. **Lock screen**: `idle → scanning → {success, failed}` with a single
//!    auto-triggered attempt after mount and a password fallback path that
//!    is reachable from every failure.
//!
//! ## Boundaries
//!
//! - The platform credential API is consumed through the
//!   [`authenticator::PlatformAuthenticator`] trait; a software
//!   authenticator ships for the CLI demo and the test suite.
//! - Profile persistence is the [`identity::IdentityStore`] trait: two
//!   opaque text fields attached to an identity record, nothing more.
//!
//! ## Operational constraint
//!
//! The relying-party identifier is explicit configuration. Credentials
//! enrolled under one relying-party id are not portable to another; changing
//! it invalidates every enrolled credential.

pub mod authenticator;
pub mod biometrics;
pub mod cli;
pub mod identity;
pub mod lockscreen;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
