pub mod table;
pub mod toml_src;

pub use table::{Table, Value};
pub use toml_src::{from_toml_str, ConfigError};
