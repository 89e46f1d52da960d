extern crate env_logger;
extern crate log;
extern crate social_forum_frontend;

pub mod cli;
pub mod file_storage;

use std::io::Write;

/// `RUST_LOG` picks the level; warnings are shown by default.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}
