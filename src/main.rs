use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ludex::app::AppContext;
use ludex::cli::{commands, Cli, Commands};
use ludex::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(&config)?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => {
            commands::register(&ctx, &name, &email, &password)?;
        }
        Commands::Login { email, password } => {
            commands::login(&ctx, &email, &password).await?;
        }
        Commands::Logout => {
            commands::logout(&ctx).await?;
        }
        Commands::Whoami => {
            commands::whoami(&ctx)?;
        }
        Commands::Browse { query, pages } => {
            commands::browse(&ctx, query.as_deref(), pages).await?;
        }
        Commands::Show { id } => {
            commands::show(&ctx, id).await?;
        }
        Commands::Bookmark { id } => {
            commands::toggle_bookmark(&ctx, id).await?;
        }
        Commands::Bookmarks => {
            commands::list_bookmarks(&ctx)?;
        }
        Commands::Open { id } => {
            commands::open_website(&ctx, id).await?;
        }
    }

    Ok(())
}
