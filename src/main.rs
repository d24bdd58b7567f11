//! taskgraph - task bookkeeping with an acyclic dependency graph

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskgraph::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
