//! Shared types for the event reconciliation pipeline
//!
//! This crate contains the data model passed between the loader, the
//! transform applicator and the bunch reshaper: per-run event tables, the
//! BIDS entities that identify a run, the resampled long-form tables and the
//! per-condition bunches handed to modelling code.

pub mod bunch;
pub mod data;
pub mod event;

// Re-export commonly used types
pub use bunch::*;
pub use data::*;
pub use event::*;
