//! # Key Subcommand
//!
//! Issuer key generation. The output is the private JWK the server reads
//! from `ISSUER_KEY`, plus the issuer DID it yields.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use credex_vc::local::DID_KEY_METHOD;
use credex_vc::{DidToolkit, Jwk, LocalToolkit};

/// Arguments for the `credex key` subcommand.
#[derive(Args, Debug)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

/// Key subcommands.
#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Generate an Ed25519 issuer key as a JWK.
    Generate {
        /// Write the JWK to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Execute the key subcommand.
pub fn run_key(args: &KeyArgs) -> Result<u8> {
    match &args.command {
        KeyCommand::Generate { output } => cmd_generate(output.as_deref()),
    }
}

fn cmd_generate(output: Option<&Path>) -> Result<u8> {
    let toolkit = LocalToolkit::new();
    let key = toolkit.generate_key()?;
    let did = toolkit.key_to_did(DID_KEY_METHOD, &key)?;
    let json = jwk_json(&key)?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write key: {}", path.display()))?;
            println!("OK: generated issuer key");
            println!("  Key: {}", path.display());
        }
        None => println!("{json}"),
    }
    eprintln!("issuer DID: {did}");
    Ok(0)
}

fn jwk_json(key: &Jwk) -> Result<String> {
    serde_json::to_string(key).context("failed to serialize key")
}
