//! Domain entities for the console driver.
//!
//! Pure data and validation rules with no infrastructure dependencies.  The
//! one entity that matters is the [`binding::BindingTable`]: it is built once
//! at startup (factory defaults overlaid with the user's configuration),
//! validated as a whole, and then only ever read.

/// Binding configuration model.
pub mod binding;
