//! Client for the palográfico review backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend owns detection, scoring and persistence. This crate talks to
//! it over HTTP and drives the pure [`review`] workspace state:
//!
//! | Module | Role |
//! |--------|------|
//! | [`api`] | `ReviewApi` trait, wire types and the reqwest implementation |
//! | [`session`] | Bearer credential and its on-disk store |
//! | [`config`] | Environment-driven client configuration |
//! | [`workspace`] | Async controller gluing the API to `review::ReviewCore` |
//! | [`poll`] | Cancellable job-status poller |
//! | [`notify`] | Transient success/error notifications |
//! | [`shell`] | Line-oriented interactive review session |
//! | [`error`] | Client error taxonomy |

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod poll;
pub mod session;
pub mod shell;
pub mod workspace;

pub use error::ApiError;
