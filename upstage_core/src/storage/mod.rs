pub mod forward;
pub mod lock;
pub mod profile;
pub mod store;

pub use forward::{Forward, ForwardSpec};
pub use lock::StoreLock;
pub use profile::{Profile, ProfileUpdate, DEFAULT_PORT};
pub use store::{ProfileStore, STORE_VERSION};
