//! Flutter bridge crate for WriteRight core.

pub mod api;
