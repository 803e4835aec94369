//! # map-uploader
//!
//! A command-line tool that packages a locally built map directory into a
//! ZIP archive and uploads it to a remote map-storage endpoint over HTTP.
//!
//! ## Overview
//!
//! The pipeline runs strictly sequentially: archive the source directory,
//! resolve and validate the configuration, upload the archive, then persist
//! any freshly supplied settings so future runs skip prompting.
//!
//! Configuration is merged from four sources with a strict precedence per
//! field: CLI flag > persisted store > interactive prompt > built-in
//! default. The storage URL must answer the `/ping` liveness check before
//! it is accepted, so a bad endpoint fails before any upload is attempted.
//!
//! Credential material (`MAP_STORAGE_API_KEY`) lives in a separate secret
//! store (`.env.secret`) and is never written to the ordinary settings
//! file, nor echoed unmasked.

pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod prompt;
pub mod upload;
pub mod vcs;
