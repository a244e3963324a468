mod clients;
mod storage;

pub use clients::rawg::{RawgClient, RawgGameBasic, RAWG_API_BASE};
pub use storage::fs_store::FileSystemStore;
