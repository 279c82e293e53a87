//! `cloudtag` command-line caller.
//!
//! # Responsibility
//! - Resolve the AWS session from the environment or a JSON file.
//! - Invoke one core adapter operation and print plain-text results.

use clap::{Parser, Subcommand};
use cloudtag_core::{
    init_logging, AdapterRegistry, AwsSession, LogConfig, Resource, ResourceAdapter, Tag,
};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "cloudtag", version, about = "List cloud resources and merge tags onto them")]
struct Cli {
    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true, default_value = "warn", env = "CLOUDTAG_LOG_LEVEL")]
    log_level: String,

    /// Absolute directory for rolling log files; logs go to stderr when unset.
    #[arg(long, global = true, env = "CLOUDTAG_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// JSON session file; the AWS_* environment is used when unset.
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Service short name, e.g. `s3`.
    service: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every resource of the service.
    List,
    /// Print the tags of one resource.
    Tags { name: String },
    /// Add or overwrite tags on one resource, keeping the others.
    Tag {
        name: String,
        /// Tags as KEY=VALUE; VALUE may be empty.
        #[arg(required = true, value_parser = parse_tag)]
        tags: Vec<Tag>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_config = LogConfig {
        level: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
    };
    if let Err(err) = init_logging(&log_config) {
        eprintln!("cloudtag: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error service={}", cli.service);
            eprintln!("cloudtag: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let session = load_session(cli.session_file.as_ref())?;
    let registry = AdapterRegistry::with_aws_defaults(&session)?;
    let adapter = registry.require(&cli.service)?;

    match &cli.command {
        Command::List => {
            for resource in adapter.list_resources(&[])? {
                println!("{resource}");
            }
        }
        Command::Tags { name } => {
            print_tags(&adapter.get_resource_tags(&Resource::new(name.as_str()))?);
        }
        Command::Tag { name, tags } => {
            let written = adapter.tag_resource(&Resource::new(name.as_str()), tags)?;
            print_tags(&written);
        }
    }
    Ok(())
}

fn load_session(path: Option<&PathBuf>) -> Result<AwsSession, Box<dyn Error>> {
    let session = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            let session: AwsSession = serde_json::from_str(&raw)
                .map_err(|err| format!("invalid session file `{}`: {err}", path.display()))?;
            session.validate()?;
            session
        }
        None => AwsSession::from_lookup(|name| std::env::var(name).ok())?,
    };
    Ok(session)
}

fn print_tags(tags: &[Tag]) {
    for tag in tags {
        println!("{}={}", tag.key, tag.value);
    }
}

fn parse_tag(raw: &str) -> Result<Tag, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let tag = Tag::new(key.trim(), value);
    tag.validate().map_err(|err| err.to_string())?;
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::{parse_tag, Cli, Command};
    use clap::Parser;
    use cloudtag_core::Tag;

    #[test]
    fn parse_tag_splits_on_first_equals_and_allows_empty_value() {
        assert_eq!(parse_tag("env=prod"), Ok(Tag::new("env", "prod")));
        assert_eq!(parse_tag("url=a=b"), Ok(Tag::new("url", "a=b")));
        assert_eq!(parse_tag("note="), Ok(Tag::new("note", "")));
    }

    #[test]
    fn parse_tag_rejects_missing_separator_and_blank_key() {
        assert!(parse_tag("env").is_err());
        assert!(parse_tag(" =x").is_err());
    }

    #[test]
    fn tag_command_collects_multiple_tags() {
        let cli = Cli::try_parse_from(["cloudtag", "s3", "tag", "logs", "env=prod", "owner=ops"])
            .expect("arguments should parse");
        assert_eq!(cli.service, "s3");
        match cli.command {
            Command::Tag { name, tags } => {
                assert_eq!(name, "logs");
                assert_eq!(tags, vec![Tag::new("env", "prod"), Tag::new("owner", "ops")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
