// CLI module for id3edit
//
// Command-line front end over the id3edit library. Only compiled into the binary.

pub mod commands;
pub mod config;
pub mod output;

pub use config::Config;
