pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ludex")]
#[command(about = "Browse a game catalog and keep bookmarks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a local account
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Log in to an existing account
    Login { email: String, password: String },
    /// Forget the logged-in account
    Logout,
    /// Show the logged-in account
    Whoami,
    /// List catalog items, optionally filtered by a search
    Browse {
        /// Search text; omit to browse everything
        #[arg(short, long)]
        query: Option<String>,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Show details for a catalog item
    Show {
        /// Catalog item id
        id: i64,
    },
    /// Toggle the bookmark on a catalog item
    Bookmark {
        /// Catalog item id
        id: i64,
    },
    /// List your bookmarks
    Bookmarks,
    /// Open an item's website in the browser
    Open {
        /// Catalog item id
        id: i64,
    },
}
