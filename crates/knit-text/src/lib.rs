#![forbid(unsafe_code)]

//! Interpolation for knit templates.
//!
//! Scans text for `{{ key }}` markers, extracts their keys, and resolves
//! them against a [`Lookup`] in a single pass.

pub mod interpolation;

pub use interpolation::{
    FnLookup, Keys, Lookup, Marker, Markers, MissingKey, Resolution, has_markers,
    interpolation_keys, resolve, scan,
};
