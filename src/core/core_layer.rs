// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "extraction/mod.rs"]
pub mod extraction;
