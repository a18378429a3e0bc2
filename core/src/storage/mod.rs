mod cli;
mod mount;

pub use cli::{parse_container_id, parse_pool_create, Pool, StorageCli};
pub use mount::MountManager;
