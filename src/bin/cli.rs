//! BreezeKV CLI Client
//!
//! Command-line interface for interacting with BreezeKV.
//!
//! Transactions are server-side state named by id, so a transaction opened
//! by one invocation can be continued by later ones: `begin t1`, then
//! `set k v --txn t1`, then `commit t1`.

use std::net::TcpStream;
use std::process::ExitCode;

use breezekv::protocol::{read_response, write_command, Command, Response, Status};
use breezekv::Result;
use clap::{Parser, Subcommand};

/// BreezeKV CLI
#[derive(Parser, Debug)]
#[command(name = "breezekv-cli")]
#[command(about = "CLI for the BreezeKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7379")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,

        /// Read from this transaction's buffer instead of the store
        #[arg(short, long)]
        txn: Option<String>,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Buffer the write in this transaction instead of committing it
        #[arg(short, long)]
        txn: Option<String>,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,

        /// Buffer the delete in this transaction instead of committing it
        #[arg(short, long)]
        txn: Option<String>,
    },

    /// Open a named transaction
    Begin {
        /// The transaction id
        txn_id: String,
    },

    /// Validate and apply a transaction
    Commit {
        /// The transaction id
        txn_id: String,
    },

    /// Discard a transaction
    Rollback {
        /// The transaction id
        txn_id: String,
    },

    /// Ping the server
    Ping,
}

impl Commands {
    /// Translate the CLI subcommand into a wire command
    fn into_command(self) -> Command {
        match self {
            Commands::Get { key, txn: None } => Command::Get { key },
            Commands::Get {
                key,
                txn: Some(txn_id),
            } => Command::TxnGet { txn_id, key },
            Commands::Set {
                key,
                value,
                txn: None,
            } => Command::Put { key, value },
            Commands::Set {
                key,
                value,
                txn: Some(txn_id),
            } => Command::TxnPut { txn_id, key, value },
            Commands::Del { key, txn: None } => Command::Delete { key },
            Commands::Del {
                key,
                txn: Some(txn_id),
            } => Command::TxnDelete { txn_id, key },
            Commands::Begin { txn_id } => Command::TxnBegin { txn_id },
            Commands::Commit { txn_id } => Command::TxnCommit { txn_id },
            Commands::Rollback { txn_id } => Command::TxnRollback { txn_id },
            Commands::Ping => Command::Ping,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let response = match send(&args.server, args.command.into_command()) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match response.status {
        Status::Ok => {
            if let Some(payload) = response.payload {
                println!("{}", String::from_utf8_lossy(&payload));
            } else {
                println!("OK");
            }
            ExitCode::SUCCESS
        }
        Status::NotFound => {
            println!("(not found)");
            ExitCode::SUCCESS
        }
        Status::Error => {
            match response.error_parts() {
                Some((Some(code), message)) => eprintln!("error [{}]: {}", code, message),
                Some((None, message)) => eprintln!("error: {}", message),
                None => eprintln!("error: malformed error response"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Send one command and read back its response
fn send(server: &str, command: Command) -> Result<Response> {
    let mut stream = TcpStream::connect(server)?;
    write_command(&mut stream, &command)?;
    read_response(&mut stream)
}
