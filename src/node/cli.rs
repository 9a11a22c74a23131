use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::node::config::{BridgeConfig, BridgeOptions};
use crate::node::Bridge;
use crate::utils::{init_logging, BridgeError};

/// HTTP front end for an lnd node.
#[derive(Parser, Debug)]
#[command(name = "tipbridge", version)]
pub struct Cli {
    /// TOML file with the same keys as the long options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Serve the HTTP endpoints (default)
    Run {
        #[command(flatten)]
        opts: BridgeOptions,
    },
    /// Load credentials, dial lnd, print the node pubkey and exit
    Check {
        #[command(flatten)]
        opts: BridgeOptions,
    },
}

impl Cli {
    fn config(&self, opts: BridgeOptions) -> Result<BridgeConfig> {
        let file = match &self.config {
            Some(path) => BridgeOptions::load(path)?,
            None => BridgeOptions::default(),
        };
        Ok(file.merge(opts).resolve()?)
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let res = run(&cli).await;
    if let Err(e) = &res {
        match e.downcast_ref::<BridgeError>() {
            Some(be) if be.is_startup() => tracing::error!("startup aborted: {}", be),
            _ => tracing::error!("{:#}", e),
        }
    }
    res
}

async fn run(cli: &Cli) -> Result<()> {
    let default_cmd = Cmd::Run { opts: BridgeOptions::default() };
    let cmd = cli.cmd.as_ref().unwrap_or(&default_cmd);

    match cmd {
        Cmd::Check { opts } => {
            let cfg = cli.config(opts.clone())?;
            let lnd = Bridge::new(cfg).connect().await?;
            let info = lnd.get_info().await?;
            println!("connected to {} ({}) pubkey {}", info.alias, info.version, info.identity_pubkey);
            Ok(())
        }
        Cmd::Run { opts } => {
            let cfg = cli.config(opts.clone())?;
            let running = Bridge::new(cfg).start().await?;
            tracing::info!("serving on http://{}", running.http_addr);

            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutting down bridge...");
            running.handle.shutdown().await?;
            tracing::info!("Bridge stopped");
            Ok(())
        }
    }
}
