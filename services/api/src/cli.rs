use crate::operator::{run_tenants_list, run_tenants_resolve, ResolveArgs, SeedArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tenant_site::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "tenant-site",
    about = "Serve and inspect the multi-tenant site edge",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the tenant directory without starting the server
    Tenants {
        #[command(subcommand)]
        command: TenantsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TenantsCommand {
    /// List seeded tenants with their domains
    List(SeedArgs),
    /// Show which tenant a host name resolves to
    Resolve(ResolveArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Tenants {
            command: TenantsCommand::List(args),
        } => run_tenants_list(args),
        Command::Tenants {
            command: TenantsCommand::Resolve(args),
        } => run_tenants_resolve(args),
    }
}
