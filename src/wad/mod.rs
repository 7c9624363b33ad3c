pub mod level;
pub mod loader;
pub mod raw;

pub use level::{LevelError, RawBlockmap, RawLevel};
pub use loader::{LoadError, load_level};
pub use raw::{LumpInfo, Wad, WadError};
