//! Utility modules for Sample Fetch
//!
//! This module contains the helpers every source builds on:
//! - `files`: Directory management, metadata sidecars and no-clobber writes
//! - `http`: HTTP client construction and the streamed download helper

pub mod files;
pub mod http;
