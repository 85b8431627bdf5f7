pub mod config;
pub mod constants;
pub mod io;

pub use config::Config;
pub use io::{prompt_yes_no, read_optional_lines, read_secret_lines};
