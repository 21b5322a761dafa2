#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sends one templated email through the configured SMTP relay

use anyhow::{Context, Result};
use clap::Parser;
use relay_mailer::{
    domain::communication::{mailer::Mailer, templates::TemplateSet},
    infrastructure::email::smtp::MailerConfig,
};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// The mail client configuration
    #[clap(flatten)]
    pub mailer: MailerConfig,

    /// Name of the template to send
    #[arg(long, short, required_unless_present = "list_templates")]
    pub template: Option<String>,

    /// Display name of the recipient
    #[arg(long, default_value = "")]
    pub name: String,

    /// Email address of the recipient
    #[arg(long, required_unless_present = "list_templates")]
    pub to: Option<String>,

    /// JSON document the template is rendered with
    #[arg(long, default_value = "{}")]
    pub data: String,

    /// Mark the send as a sandbox send (reserved, the relay comes from --smtp-host)
    #[arg(long, env = "MAILER_SANDBOX")]
    pub sandbox: bool,

    /// Print the embedded template names and exit
    #[arg(long)]
    pub list_templates: bool,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = dotenv {
        debug!("no .env file loaded: {e}");
    }

    let args = Args::parse();

    if args.list_templates {
        for name in TemplateSet::embedded()?.names() {
            println!("{name}");
        }

        return Ok(());
    }

    let (Some(template), Some(to)) = (args.template.as_deref(), args.to.as_deref()) else {
        anyhow::bail!("--template and --to are required");
    };

    let data: Value = serde_json::from_str(&args.data).context("--data is not valid JSON")?;

    let client = args.mailer.build_client()?;

    let receipt = client
        .send(template, &args.name, to, &data, args.sandbox)
        .await?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);

    Ok(())
}
