//! Core business logic for Invoicely.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `invoice` - Line items, totals, numbering, status and the permission gate
//! - `directory` - Companies, customers and products
//! - `auth` - Password hashing and registration rules

pub mod auth;
pub mod directory;
pub mod invoice;
