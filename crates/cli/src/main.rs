//! webfinger-lookup CLI
//!
//! Command-line interface for resolving email-like identifiers to XRD
//! descriptors and for inspecting XRD files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use webfinger_lookup_client::{sort_by_priority, DiscoveryClient};
use webfinger_lookup_common::{ClientConfig, Descriptor, DiscoveryError, Property, PropertyKind};
use webfinger_lookup_parser::DocumentParser;

#[derive(Parser)]
#[command(name = "webfinger-lookup")]
#[command(version, about = "Resolve email-like identifiers via host-meta discovery", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the service descriptor for an identifier
    #[command(after_help = "EXAMPLES:\n  \
        # Look up an account\n  \
        webfinger-lookup lookup bradfitz@gmail.com\n\n  \
        # Follow lrdd links instead of describedby\n  \
        webfinger-lookup lookup --rel lrdd 'Brad <bradfitz@gmail.com>'\n\n  \
        # Print the descriptor as JSON\n  \
        webfinger-lookup lookup --json --config webfinger.yaml dewitt@unto.net")]
    Lookup {
        /// Email-like identifier (local-part@domain)
        identifier: String,

        /// YAML client configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Relation type of the discovery link (overrides config)
        #[arg(long)]
        rel: Option<String>,

        /// Print the descriptor as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse an XRD file and display its contents
    #[command(after_help = "EXAMPLES:\n  \
        webfinger-lookup parse --file host-meta.xml\n  \
        webfinger-lookup parse --file service.xrd --json")]
    Parse {
        /// Path to the XRD document
        #[arg(short, long)]
        file: PathBuf,

        /// Print the descriptor as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Lookup {
            identifier,
            config,
            rel,
            json,
        } => lookup_command(&identifier, config.as_deref(), rel, json, cli.verbose),
        Commands::Parse { file, json } => parse_command(&file, json, cli.verbose),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn lookup_command(
    identifier: &str,
    config_path: Option<&Path>,
    rel: Option<String>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ClientConfig::load(path).context("Failed to load client config")?,
        None => ClientConfig::default(),
    };
    if let Some(rel) = rel {
        config.discovery_rel = rel;
    }

    if verbose {
        eprintln!("  Identifier: {}", identifier);
        eprintln!("  Relation: {}", config.discovery_rel);
        eprintln!("  Host-meta: {}", config.host_meta_template);
    }

    let client =
        DiscoveryClient::from_config(config).context("Failed to create discovery client")?;

    if !json {
        println!("{} Looking up {}", "→".cyan(), identifier.yellow());
    }

    let descriptor = client
        .lookup(identifier)
        .map_err(|e| report(&e))
        .with_context(|| format!("Lookup failed for {}", identifier))?;

    if json {
        print_json(&descriptor)
    } else {
        println!("\n{}", "✓ Lookup successful!".green().bold());
        print_descriptor(&descriptor, verbose);
        Ok(())
    }
}

fn parse_command(file: &Path, json: bool, verbose: bool) -> Result<()> {
    if !json {
        println!("{} Parsing XRD file: {}", "→".cyan(), file.display());
    }

    let descriptor = DocumentParser::new()
        .parse_file(file)
        .context("Failed to parse XRD document")?;

    if json {
        print_json(&descriptor)
    } else {
        println!("\n{}", "✓ Parse successful!".green().bold());
        print_descriptor(&descriptor, verbose);
        Ok(())
    }
}

/// Prefix the error message with its category for display
fn report(err: &DiscoveryError) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", err.kind(), err)
}

fn print_json(descriptor: &Descriptor) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(descriptor).context("Failed to serialize descriptor")?;
    println!("{}", rendered);
    Ok(())
}

fn print_descriptor(descriptor: &Descriptor, verbose: bool) {
    println!("\n{}", "Descriptor:".bold());
    if let Some(subject) = &descriptor.subject {
        println!("  Subject: {}", subject.yellow());
    }
    if let Some(expires) = &descriptor.expires {
        println!("  Expires: {}", expires);
    }
    for alias in &descriptor.aliases {
        println!("  Alias: {}", alias);
    }
    println!("  Properties: {}", descriptor.properties.len());
    println!("  Links: {}", descriptor.links.len());

    if verbose {
        for property in &descriptor.properties {
            println!("  • {} {}", property.type_uri.cyan(), property_value(property));
        }
    }

    if !descriptor.links.is_empty() {
        println!("\n{}", "Links:".bold());
    }
    for link in sort_by_priority(&descriptor.links) {
        let priority = link
            .priority
            .map(|p| format!(" [priority {}]", p))
            .unwrap_or_default();
        println!("  • {}{}", link.relations.join(", ").cyan(), priority);

        if let Some(title) = link.title("en") {
            println!("    Title: {}", title);
        }
        for uri in sort_by_priority(&link.uris) {
            println!("    URI: {}", uri.value);
        }
        for template in sort_by_priority(&link.uri_templates) {
            println!("    Template: {}", template.value);
        }
        if verbose && !link.media_types.is_empty() {
            println!("    Media types: {}", link.media_types.join(", "));
        }
    }
}

/// Display text for a property's value, labelling the flag by source element
fn property_value(property: &Property) -> String {
    match (property.kind, property.is_nil, &property.value) {
        (PropertyKind::Type, true, _) => "(required)".dimmed().to_string(),
        (PropertyKind::Type, false, _) => String::new(),
        (PropertyKind::Property, true, _) => "(nil)".dimmed().to_string(),
        (PropertyKind::Property, false, value) => value.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lookup_args() {
        let cli = Cli::try_parse_from([
            "webfinger-lookup",
            "-v",
            "lookup",
            "--rel",
            "lrdd",
            "--json",
            "alice@x.com",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Lookup {
                identifier,
                rel,
                json,
                config,
            } => {
                assert_eq!(identifier, "alice@x.com");
                assert_eq!(rel.as_deref(), Some("lrdd"));
                assert!(json);
                assert!(config.is_none());
            }
            Commands::Parse { .. } => panic!("expected lookup command"),
        }
    }

    #[test]
    fn test_property_value_labels_flag_by_kind() {
        colored::control::set_override(false);
        let required_type = Property {
            type_uri: "http://example.com/ns".to_string(),
            value: None,
            is_nil: true,
            kind: PropertyKind::Type,
        };
        let nil_property = Property {
            kind: PropertyKind::Property,
            ..required_type.clone()
        };
        let plain_property = Property {
            value: Some("1.2".to_string()),
            is_nil: false,
            kind: PropertyKind::Property,
            ..required_type.clone()
        };

        assert_eq!(property_value(&required_type), "(required)");
        assert_eq!(property_value(&nil_property), "(nil)");
        assert_eq!(property_value(&plain_property), "1.2");
    }

    #[test]
    fn test_report_prefixes_error_kind() {
        let err = DiscoveryError::Protocol("no discovery-service link".to_string());
        assert_eq!(
            report(&err).to_string(),
            "ProtocolError: Protocol error: no discovery-service link"
        );
    }
}
