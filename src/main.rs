//! abi-guard CLI binary.
//!
//! All logic lives in the library; this entrypoint only invokes
//! `cli::run()` and maps its exit code to the process exit status.

fn main() {
    std::process::exit(abi_guard::cli::run());
}
