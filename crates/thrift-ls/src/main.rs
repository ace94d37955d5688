//! Thrift language server binary.
//!
//! Usage:
//!   thriftls [options]
//!
//! Options:
//!   --stdio      Use stdio for communication (default)
//!   --log        Enable logging to stderr (debug level; RUST_LOG overrides)
//!   --health     Quick health check
//!   --version    Show version information
//!   --help       Show this help message

use anyhow::Result;
use std::env;
use std::io;
use std::process;
use thrift_ls::LspServer;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the stderr subscriber. Stdout carries the LSP channel, so logs
/// must never go there.
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut enable_logging = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stdio" => {}
            "--log" => enable_logging = true,
            "--health" => {
                println!("ok {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--version" => {
                println!("thriftls {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_help();
                process::exit(3);
            }
        }
        i += 1;
    }

    if enable_logging {
        init_logging("thrift_ls=debug,thrift_store=debug,thrift_syntax=debug");
        tracing::info!("thriftls starting (stdio)");
    }

    let mut server = LspServer::new();
    let code = server.run()?;
    process::exit(code);
}

fn print_help() {
    eprintln!("Thrift Language Server");
    eprintln!();
    eprintln!("Usage: thriftls [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --stdio    Use stdio for communication (default)");
    eprintln!("  --log      Enable stderr logging (RUST_LOG overrides the filter)");
    eprintln!("  --health   Quick health check (prints 'ok <version>')");
    eprintln!("  --version  Show version information");
    eprintln!("  --help     Show this help message");
}
