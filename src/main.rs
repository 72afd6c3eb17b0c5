//! Warden demo binary - role-scoped tool visibility against a live server.
//!
//! Spawns a stdio tool server, binds the standard role filters, and
//! prints the catalog each role is allowed to see, plus the endpoint the
//! resolver would hand the runtime. Mirrors a real deployment's wiring
//! without running an agent loop.

use std::sync::Arc;

use clap::Parser;

use warden_core::model::ModelProviderResolver;
use warden_core::server::{ServerConnection, StdioServerParams, StdioToolServer};
use warden_core::tools::{standard_roles, IdentityContext, ToolAccessGate};
use warden_core::Config;

#[derive(Debug, Parser)]
#[command(name = "warden", about = "Inspect role-scoped tool visibility")]
struct Args {
    /// Tool server executable.
    #[arg(long, default_value = "npx")]
    command: String,

    /// Arguments for the tool server executable.
    #[arg(long, num_args = 0.., allow_hyphen_values = true)]
    server_arg: Vec<String>,

    /// Only show this role (default: all bound roles).
    #[arg(long)]
    role: Option<String>,

    /// Model name to resolve (default: configured default model).
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration errors are fatal before any connection is attempted.
    let config = Config::from_env()?;
    warden_core::observability::init_tracing(&config.observability);

    let resolver = ModelProviderResolver::new(&config.model);
    match resolver.resolve(args.model.as_deref()) {
        Ok(endpoint) => println!("model endpoint: {:?}", endpoint),
        Err(err) => println!("model endpoint unavailable: {}", err),
    }

    let params = StdioServerParams::new(args.command, args.server_arg);
    let server = Arc::new(
        StdioToolServer::connect("filesystem", &params, config.server.clone()).await?,
    );

    let gate = ToolAccessGate::new(config.observability.trace_decisions);
    let roles = standard_roles();
    let selected: Vec<String> = match args.role {
        Some(role) => vec![role],
        None => roles.roles().iter().map(|r| r.to_string()).collect(),
    };

    for role in &selected {
        let connection = ServerConnection::bind(
            server.clone(),
            roles.filter_for(role).clone(),
            gate,
        );
        let context = IdentityContext::new(role.clone());
        let resolved = connection.visible_tools(&context).await?;

        println!("\nrole '{}': {} tool(s)", role, resolved.len());
        for tool in resolved.iter() {
            println!("  - {}: {}", tool.name, tool.description);
        }
        for warning in &resolved.warnings {
            println!("  ! {}", warning);
        }
    }

    // server is shared; unwrap the last reference to shut it down cleanly.
    if let Ok(server) = Arc::try_unwrap(server) {
        server.shutdown().await?;
    }

    Ok(())
}
