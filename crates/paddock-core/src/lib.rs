// paddock-core: inventory model, cache, and the inventory builder.

pub mod builder;
pub mod cache;
pub mod error;
pub mod inventory;
pub mod prompt;

pub use builder::{BuilderConfig, InventoryBuilder};
pub use cache::{DEFAULT_TTL, InventoryCache};
pub use error::CoreError;
pub use inventory::{Group, Inventory};
pub use prompt::CredentialPrompt;
