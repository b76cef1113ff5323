pub mod args;

pub use args::{Cli, Commands, RenderArgs, RequestArgs, SourceArgs, DEFAULT_TEMPLATE};
