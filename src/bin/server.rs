//! hirematch HTTP server binary.
//! Run with: cargo run --bin hirematch-server

use std::process::ExitCode;

use hirematch::start_hirematch;

fn main() -> ExitCode {
    start_hirematch::run()
}
