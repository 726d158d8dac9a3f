//! Contact enquiry intake for the Lourdes Garden export storefront.
//!
//! The crate owns the full submission pipeline: payload validation, the
//! durable submission store behind [`intake::EnquiryRepository`], per-address
//! rate limiting, the outbound notification seam, and the HTTP surface that
//! ties them together. Server bootstrap and the verification tooling live in
//! the `services/api` binary.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
