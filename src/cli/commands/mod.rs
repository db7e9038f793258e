mod cache;
mod init;
mod schema;
mod seed;

pub use cache::{ClearCacheArgs, cmd_clear_cache};
pub use init::cmd_init;
pub use schema::cmd_check_schema;
pub use seed::cmd_seed;
