//! HTTP middleware and request extractors.

pub mod auth;
