//! plancheck command-line application.
//!
//! The binary in `main.rs` is the composition root: it parses arguments,
//! resolves [`config::Settings`], installs the tracing subscriber, builds the
//! OpenAI provider, and hands everything to a subcommand. The pieces live in
//! this library so they can be tested without a process boundary.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`args`] | clap definitions |
//! | [`config`] | defaults, `plancheck.toml`, environment, flags |
//! | [`observability`] | `tracing-subscriber` and optional OTLP export |
//! | [`report`] | text and JSON report rendering |
//! | [`commands`] | `analyze` and `agent` |

pub mod args;
pub mod commands;
pub mod config;
pub mod observability;
pub mod report;
