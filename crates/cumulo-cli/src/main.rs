//! cumulo — operator CLI for the Cumulo hosting platform.
//!
//! Read commands render resource tables; mutating commands submit to the
//! control plane and block on the resulting notification until it reaches a
//! terminal state (or times out / is interrupted), then exit with a code
//! distinguishing the outcome.
//!
//! v1 wires the in-memory control plane from `cumulo-core` (the wire
//! protocol is out of scope); swapping in a real client is the one `Arc`
//! construction in `main`.

mod render;

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;

use cumulo_core::app::{CreateTag, DeleteTag, Dispatcher, MutatingCommand};
use cumulo_core::domain::ApiError;
use cumulo_core::impls::InMemoryCloudApi;
use cumulo_core::ports::CloudApi;
use cumulo_core::wait::{BackoffPolicy, WaitConfig};

#[derive(Parser)]
#[command(name = "cumulo", version, about = "Manage applications, environments, databases and tags on the Cumulo platform")]
struct Cli {
    #[command(flatten)]
    wait: WaitFlags,

    #[command(subcommand)]
    command: Commands,
}

/// Knobs for the asynchronous-task wait loop (mutating commands only).
#[derive(Args)]
struct WaitFlags {
    /// Overall wait budget for an asynchronous operation, in seconds.
    #[arg(long, global = true, default_value_t = 600)]
    timeout_secs: u64,

    /// Delay before the second status poll, in seconds.
    #[arg(long, global = true, default_value_t = 2)]
    initial_delay_secs: u64,

    /// Cap on the backoff delay, in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    max_delay_secs: u64,

    /// Jitter band as a fraction of the computed delay (0 disables).
    #[arg(long, global = true, default_value_t = 0.0)]
    jitter: f64,

    /// Give up after this many consecutive inconclusive polls instead of
    /// waiting out the full budget.
    #[arg(long, global = true)]
    max_unknown: Option<u32>,
}

impl WaitFlags {
    fn policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
            jitter_fraction: self.jitter,
            ..BackoffPolicy::default()
        }
    }

    fn config(&self) -> WaitConfig {
        WaitConfig {
            overall_timeout: Duration::from_secs(self.timeout_secs),
            max_consecutive_unknown: self.max_unknown,
            ..WaitConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Applications you have access to.
    Application {
        #[command(subcommand)]
        cmd: ApplicationCmd,
    },

    /// Environments of an application.
    Environment {
        #[command(subcommand)]
        cmd: EnvironmentCmd,
    },

    /// Databases of an application.
    Database {
        #[command(subcommand)]
        cmd: DatabaseCmd,
    },

    /// Application tags (asynchronous mutations).
    Tag {
        #[command(subcommand)]
        cmd: TagCmd,
    },
}

#[derive(Subcommand)]
enum ApplicationCmd {
    /// List all applications.
    List,

    /// Show environments and databases of one application.
    Info { uuid: String },

    /// List the tags on an application.
    Tags { uuid: String },
}

#[derive(Subcommand)]
enum EnvironmentCmd {
    /// List environments of an application.
    List { uuid: String },
}

#[derive(Subcommand)]
enum DatabaseCmd {
    /// List databases of an application.
    List { uuid: String },
}

#[derive(Subcommand)]
enum TagCmd {
    /// Create a tag and wait for the backend task to finish.
    Create {
        uuid: String,
        name: String,
        color: String,
    },

    /// Delete a tag and wait for the backend task to finish.
    Delete { uuid: String, name: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let api: Arc<dyn CloudApi> = Arc::new(InMemoryCloudApi::with_demo_data());

    // Ctrl-C flips the cancel flag; the waiter observes it at its next
    // suspension point and reports a cancelled outcome.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let code = run(cli, api, cancel_rx).await;
    std::process::exit(code);
}

async fn run(cli: Cli, api: Arc<dyn CloudApi>, cancel: watch::Receiver<bool>) -> i32 {
    match cli.command {
        Commands::Application { cmd } => match cmd {
            ApplicationCmd::List => match api.list_applications().await {
                Ok(apps) => {
                    print!("{}", render::applications(&apps));
                    0
                }
                Err(err) => report_api_error(err),
            },
            ApplicationCmd::Info { uuid } => application_info(api.as_ref(), &uuid).await,
            ApplicationCmd::Tags { uuid } => match api.list_tags(&uuid).await {
                Ok(tags) => {
                    print!("{}", render::tags(&tags));
                    0
                }
                Err(err) => report_api_error(err),
            },
        },

        Commands::Environment { cmd } => match cmd {
            EnvironmentCmd::List { uuid } => match api.list_environments(&uuid).await {
                Ok(envs) => {
                    print!("{}", render::environments(&envs, &[]));
                    0
                }
                Err(err) => report_api_error(err),
            },
        },

        Commands::Database { cmd } => match cmd {
            DatabaseCmd::List { uuid } => match api.list_databases(&uuid).await {
                Ok(dbs) => {
                    print!("{}", render::databases(&dbs));
                    0
                }
                Err(err) => report_api_error(err),
            },
        },

        Commands::Tag { cmd } => {
            let command: Box<dyn MutatingCommand> = match cmd {
                TagCmd::Create { uuid, name, color } => Box::new(CreateTag {
                    app_uuid: uuid,
                    name,
                    color,
                }),
                TagCmd::Delete { uuid, name } => Box::new(DeleteTag {
                    app_uuid: uuid,
                    name,
                }),
            };

            let dispatcher = Dispatcher::new(api, cli.wait.policy(), cli.wait.config());
            let outcome = dispatcher.run(command.as_ref(), cancel).await;
            println!("{}", outcome.report());
            outcome.exit_code()
        }
    }
}

/// `application info`: environments table with attached databases, plus the
/// legend for the mode markers.
async fn application_info(api: &dyn CloudApi, uuid: &str) -> i32 {
    let environments = match api.list_environments(uuid).await {
        Ok(envs) => envs,
        Err(err) => return report_api_error(err),
    };
    let databases = match api.list_databases(uuid).await {
        Ok(dbs) => dbs,
        Err(err) => return report_api_error(err),
    };

    let db_names: Vec<String> = databases.iter().map(|d| d.name.clone()).collect();
    print!("{}", render::environments(&environments, &db_names));

    if let Some(url) = environments.iter().find_map(|e| e.vcs_url.as_deref()) {
        println!("🔧  Git URL: {url}");
    }
    println!("💻  indicates environment in livedev mode.");
    println!("🔒  indicates environment in production mode.");
    0
}

fn report_api_error(err: ApiError) -> i32 {
    eprintln!("Error: {err}");
    1
}
