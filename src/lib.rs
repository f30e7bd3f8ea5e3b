//! Primary insurance amount engine for Social Security benefits
//!
//! This crate computes a worker's primary insurance amount (PIA) and
//! maximum family benefit (MFB) from an earnings record, under every
//! benefit method that applies, and derives the monthly benefits of the
//! worker and the family members claiming on the record.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
