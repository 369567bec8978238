// src/sites/mod.rs
// =============================================================================
// This module knows what a "site" is and where the list of sites comes from.
//
// Submodules:
// - site: The Site type and placeholder substitution (the URL resolver)
// - load: Reads the comma-separated site list from disk
// =============================================================================

mod load;
mod site;

pub use load::load_sites;
pub use site::Site;
