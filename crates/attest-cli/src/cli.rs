use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "attest",
    about = "Attest: tamper-evident proof of existence for documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Gateway configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Commit log path, overrides the configuration file
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

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
    /// Print the fingerprint of a file
    Hash(HashArgs),
    /// Register a document fingerprint
    Register(RegisterArgs),
    /// Revoke a registration you own
    Revoke(RevokeArgs),
    /// Check whether a fingerprint was registered
    Verify(VerifyArgs),
    /// List the documents registered by a wallet
    List(ListArgs),
    /// Show the committed events for one fingerprint
    History(HistoryArgs),
    /// Verify the commit-log chain and print totals
    Audit(AuditArgs),
}

#[derive(Args)]
pub struct HashArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub wallet: String,
    /// Fingerprint this file instead of passing --hash
    #[arg(long, conflicts_with = "hash", required_unless_present = "hash")]
    pub file: Option<PathBuf>,
    #[arg(long, requires = "name")]
    pub hash: Option<String>,
    /// Document name; defaults to the file name with --file
    #[arg(long)]
    pub name: Option<String>,
    /// External storage pointer, e.g. an IPFS CID
    #[arg(long)]
    pub cid: Option<String>,
}

#[derive(Args)]
pub struct RevokeArgs {
    #[arg(long)]
    pub wallet: String,
    #[arg(long)]
    pub hash: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub hash: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    pub wallet: String,
}

#[derive(Args)]
pub struct HistoryArgs {
    #[arg(long)]
    pub hash: String,
}

#[derive(Args)]
pub struct AuditArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0xa11ce00000000000000000000000000000000001";

    #[test]
    fn parse_hash() {
        let cli = Cli::try_parse_from(["attest", "hash", "report.pdf"]).unwrap();
        if let Command::Hash(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("report.pdf"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_register_with_hash() {
        let cli = Cli::try_parse_from([
            "attest", "register", "--wallet", WALLET, "--hash", "abc", "--name", "doc.pdf",
            "--cid", "bafy",
        ])
        .unwrap();
        if let Command::Register(args) = cli.command {
            assert_eq!(args.hash.as_deref(), Some("abc"));
            assert_eq!(args.name.as_deref(), Some("doc.pdf"));
            assert_eq!(args.cid.as_deref(), Some("bafy"));
            assert!(args.file.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_register_with_file() {
        let cli =
            Cli::try_parse_from(["attest", "register", "--wallet", WALLET, "--file", "a.pdf"])
                .unwrap();
        if let Command::Register(args) = cli.command {
            assert_eq!(args.file, Some(PathBuf::from("a.pdf")));
            assert!(args.name.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn register_needs_a_source() {
        assert!(Cli::try_parse_from(["attest", "register", "--wallet", WALLET]).is_err());
    }

    #[test]
    fn register_hash_needs_name() {
        assert!(
            Cli::try_parse_from(["attest", "register", "--wallet", WALLET, "--hash", "abc"])
                .is_err()
        );
    }

    #[test]
    fn register_file_and_hash_conflict() {
        assert!(Cli::try_parse_from([
            "attest", "register", "--wallet", WALLET, "--file", "a", "--hash", "b", "--name", "n",
        ])
        .is_err());
    }

    #[test]
    fn parse_revoke() {
        let cli =
            Cli::try_parse_from(["attest", "revoke", "--wallet", WALLET, "--hash", "abc"]).unwrap();
        if let Command::Revoke(args) = cli.command {
            assert_eq!(args.wallet, WALLET);
            assert_eq!(args.hash, "abc");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["attest", "verify", "--hash", "abc"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
        assert!(Cli::try_parse_from(["attest", "verify"]).is_err());
    }

    #[test]
    fn parse_list_and_audit() {
        let cli = Cli::try_parse_from(["attest", "list", "--wallet", WALLET]).unwrap();
        assert!(matches!(cli.command, Command::List(_)));
        let cli = Cli::try_parse_from(["attest", "audit"]).unwrap();
        assert!(matches!(cli.command, Command::Audit(_)));
    }

    #[test]
    fn parse_globals() {
        let cli = Cli::try_parse_from([
            "attest", "audit", "--log", "/tmp/a.log", "--config", "attest.toml", "--format",
            "json", "-v",
        ])
        .unwrap();
        assert_eq!(cli.log, Some(PathBuf::from("/tmp/a.log")));
        assert_eq!(cli.config, Some(PathBuf::from("attest.toml")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }
}
