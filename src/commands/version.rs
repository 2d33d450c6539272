//! Command: print version information.

/// Print the sdkdist version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let version = option_env!("SDKDIST_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("sdkdist {version}");
}
