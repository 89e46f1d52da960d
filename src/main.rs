extern crate social_forum;
extern crate tokio;

use clap::Parser;

use social_forum::cli::{self, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    social_forum::init_logger();

    cli::run(Cli::parse()).await
}
