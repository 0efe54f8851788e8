use clap::Parser;
use hashbench::{run, Args};
use std::process::{self, ExitCode};

fn main() -> ExitCode {
    let args = Args::parse();

    // Ctrl-C aborts immediately, without a partial summary
    if let Err(e) = ctrlc::set_handler(|| process::exit(1)) {
        eprintln!("[!] Failed to install interrupt handler: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[!] {:#}", e);
            ExitCode::FAILURE
        }
    }
}
