// The infra module contains implementations of core traits.
// Each external system gets its own submodule.

#[path = "google_docs/mod.rs"]
pub mod google_docs;

#[path = "images/mod.rs"]
pub mod images;
