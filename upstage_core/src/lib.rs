pub mod errors;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use errors::StoreError;
pub use storage::{Forward, ForwardSpec, Profile, ProfileStore, ProfileUpdate};
