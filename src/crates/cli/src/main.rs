use clap::Parser;
use ferrule_cli::cmd::decode::decode_cmd;
use ferrule_cli::{Cli, Command};
use ferrule_errors::FerruleError;

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cmd: Result<(), FerruleError> = match cli.command {
        None => Ok(()),
        Some(cmd) => match cmd {
            Command::Decode(options) => decode_cmd(options),
        },
    };

    if let Err(e) = cmd {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
