//! # credstack-cli — Credential Schema Tooling
//!
//! Library half of the `credstack` binary. Each subcommand lives in its
//! own module with an `Args` struct and a `run_*` entry point returning
//! the process exit code, so integration tests can drive them without
//! spawning a process.
//!
//! ## Subcommands
//!
//! - **resolve**: resolve a payload against one credential type of a
//!   collection and print the effective property set ([`resolve`]).
//! - **audit**: report structural findings in collections ([`audit`]).
//! - **check**: meta-schema validation only ([`check`]).
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Error, failed check or audit findings |
//! | 2 | Payload rejected by `resolve` |

pub mod audit;
pub mod check;
pub mod config;
pub mod resolve;
