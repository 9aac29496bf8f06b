use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tasktick")]
#[command(about = "A personal task tracker with time-derived task statuses", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task
    Add {
        name: String,

        /// Date as dd/MM/yyyy (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Start time as HH:mm (defaults to now)
        #[arg(short, long)]
        time: Option<String>,

        /// Duration in whole hours
        #[arg(short = 'H', long, default_value_t = 1)]
        duration: i64,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,
    },
    /// List tasks ordered by urgency
    List {
        /// Include completed tasks
        #[arg(short, long)]
        all: bool,
    },
    /// Mark a task as completed
    Done { id: i64 },
    /// Delete a task by id
    Delete { id: i64 },
    /// Export uncompleted tasks to an HTML file
    Export { path: Option<PathBuf> },
    /// Run the API server with the background status worker
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Live view: poll, reconcile and reprint the list when it changes
    Watch,
}
