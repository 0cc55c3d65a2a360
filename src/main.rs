use std::{env, io, process::ExitCode};

use anyhow::Result;
use log::info;

mod error;
mod http;

use error::Error;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", diagnostic(&error));
            ExitCode::FAILURE
        }
    }
}

fn run(mut args: impl Iterator<Item = String>) -> Result<()> {
    let program = args
        .next()
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    let (Some(address), None) = (args.next(), args.next()) else {
        return Err(Error::Usage { program }.into());
    };

    let client = http::Client::new(&address)?;
    let received = client.get(io::stdout().lock())?;

    info!("{received} bytes received from {address}");
    Ok(())
}

/// Renders the single line printed for a failed run, appending the OS error
/// found anywhere in the chain.
fn diagnostic(error: &anyhow::Error) -> String {
    let mut line = error.to_string();

    let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<io::Error>()) else {
        return line;
    };
    match io_error.raw_os_error() {
        Some(code) => {
            let text = io_error.to_string();
            let suffix = format!(" (os error {code})");
            let description = text.strip_suffix(&suffix).unwrap_or(&text);
            line.push_str(&format!(" (errno {code}: {description})"));
        }
        None => line.push_str(&format!(" ({io_error})")),
    }
    line
}
