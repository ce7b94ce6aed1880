use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "logchain",
    about = "LogChain: tamper-evident log batches anchored on a public ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the batch fingerprint of log files or directories
    Fingerprint(FingerprintArgs),
    /// Produce an inclusion proof for one log line
    Prove(ProveArgs),
    /// Submit log batches to a LogChain server and request anchoring
    Push(PushArgs),
    /// Ask a LogChain server whether a batch is on the ledger
    Verify(VerifyArgs),
    /// Run the LogChain HTTP API
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct FingerprintArgs {
    /// Files, or directories whose files are read in name order
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ProveArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Zero-based index of the line within the batch
    #[arg(short, long)]
    pub line: usize,
}

#[derive(Args)]
pub struct PushArgs {
    /// Directory holding the device's log files
    pub log_dir: PathBuf,
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub server: String,
    #[arg(long, env = "DEVICE_ID", default_value = "devA23")]
    pub device: String,
    #[arg(long)]
    pub user: Option<String>,
    /// Off-ledger location of the batch content
    #[arg(long)]
    pub content_ref: Option<String>,
    /// Only submit the batch; do not request anchoring
    #[arg(long)]
    pub no_anchor: bool,
    /// Repeat every SECS seconds instead of pushing once
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub batch_id: String,
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub server: String,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML file with [server] and [ledger] sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fingerprint() {
        let cli = Cli::try_parse_from(["logchain", "fingerprint", "logs/", "extra.log"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        match cli.command {
            Command::Fingerprint(args) => assert_eq!(args.paths.len(), 2),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parses_push_with_interval() {
        let cli = Cli::try_parse_from([
            "logchain", "--format", "json", "push", "./logs", "--device", "devB", "--interval", "60",
            "--no-anchor",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Push(args) => {
                assert_eq!(args.device, "devB");
                assert_eq!(args.interval, Some(60));
                assert!(args.no_anchor);
                assert_eq!(args.server, "http://127.0.0.1:8000");
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn prove_requires_line() {
        assert!(Cli::try_parse_from(["logchain", "prove", "a.log"]).is_err());
        assert!(Cli::try_parse_from(["logchain", "prove", "a.log", "--line", "3"]).is_ok());
    }

    #[test]
    fn serve_bind_must_be_address() {
        assert!(Cli::try_parse_from(["logchain", "serve", "--bind", "nowhere"]).is_err());
        let cli = Cli::try_parse_from(["logchain", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Command::Serve(args) => assert_eq!(args.bind.unwrap().port(), 8080),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn fingerprint_needs_a_path() {
        assert!(Cli::try_parse_from(["logchain", "fingerprint"]).is_err());
    }
}
