//! `envault` — encrypted .env sharing for development teams.
//!
//! Secrets live encrypted inside the repository; access is granted and
//! revoked per device public key. This binary is the thin interactive
//! layer over the vault engine: argument parsing, password prompts,
//! editor spawning, and exit codes.

mod commands;
mod editor;
mod envfile;
mod failure;
mod prompt;

use clap::{Parser, Subcommand};
use failure::Failure;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envault", version, about = "Encrypted .env vaults shared per device")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create this device's identity (keypair, salt, config)
    Init {
        /// Device label shown to teammates; prompted for when omitted
        #[arg(long)]
        label: Option<String>,
    },
    /// Print this device's public key and fingerprint
    Identity,
    /// Create a local vault in the current project from an env file
    InitRepo {
        /// Plaintext env file to seed the vault; empty template when omitted
        env_file: Option<String>,
    },
    /// Put content into a vault (from a file or stdin)
    Add {
        /// Vault name, or "." for the current project
        target: String,
        /// Plaintext file; stdin when omitted
        file: Option<String>,
    },
    /// Decrypt a vault (to stdout or a file)
    Get {
        /// Vault name, or "." for the current project
        #[arg(default_value = ".")]
        target: String,
        /// Output file; stdout when omitted
        out_file: Option<String>,
    },
    /// Grant a device access to a vault
    Share {
        /// Vault name, or "." for the current project
        target: String,
        /// The recipient device's public key (base64)
        public_key: String,
        /// Label for the recipient; derived from the fingerprint when omitted
        label: Option<String>,
    },
    /// Remove a device's access and rotate the vault key
    Revoke {
        /// Vault name, or "." for the current project
        target: String,
        /// Fingerprint of the device to remove
        fingerprint: String,
    },
    /// List a vault's recipients
    Recipients {
        /// Vault name, or "." for the current project
        #[arg(default_value = ".")]
        target: String,
    },
    /// List central vaults
    List,
    /// Delete a central vault
    Rm {
        name: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Open a vault's content in $EDITOR and re-encrypt on change
    Edit {
        /// Vault name, or "." for the current project
        #[arg(default_value = ".")]
        target: String,
    },
    /// Check on-disk modes, KDF parameters, and gitignore coverage
    Doctor {
        /// Tighten loose modes in place
        #[arg(long)]
        fix: bool,
    },
    /// Delete this device's identity
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result: Result<(), Failure> = match cli.command {
        Command::Init { label } => commands::init(label.as_deref()),
        Command::Identity => commands::identity(),
        Command::InitRepo { env_file } => commands::init_repo(env_file.as_deref()),
        Command::Add { target, file } => commands::add(&target, file.as_deref()),
        Command::Get { target, out_file } => commands::get(&target, out_file.as_deref()),
        Command::Share { target, public_key, label } => {
            commands::share(&target, &public_key, label.as_deref())
        }
        Command::Revoke { target, fingerprint } => commands::revoke(&target, &fingerprint),
        Command::Recipients { target } => commands::recipients(&target),
        Command::List => commands::list(),
        Command::Rm { name, force } => commands::rm(&name, force),
        Command::Edit { target } => commands::edit(&target),
        Command::Doctor { fix } => commands::doctor(fix),
        Command::Reset { force } => commands::reset(force),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}
