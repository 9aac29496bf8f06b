use tasktick::api::{AppState, routes};
use tasktick::cli::{Cli, Commands};
use tasktick::config::Config;
use tasktick::export::export_tasks_to_html;
use tasktick::monitor::{self, RefreshSink};
use tasktick::storage::Database;
use tasktick::task::{
    DATE_FORMAT, SystemClock, Task, TaskStatus, TIME_FORMAT, reconcile, sort_for_display,
};
use tasktick::utils::paths;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Logging for one-shot commands: terse, stderr only.
fn init_stderr_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Logging for the long-running modes (`serve`, `watch`): daily rolling file
/// under the data directory. The returned guard must stay alive for the
/// process lifetime.
fn init_file_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let logs_dir = paths::get_logs_dir().ok()?;
    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Warning: Could not create logs directory: {}", e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "tasktick.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .init();

    Some(guard)
}

fn open_database() -> Result<Database> {
    let dir = paths::get_tasktick_dir()?;
    fs::create_dir_all(&dir)?;
    Database::open(&paths::get_database_path()?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Some(Commands::Add {
            name,
            date,
            time,
            duration,
            description,
            location,
        }) => {
            init_stderr_logging();
            handle_add(name, date, time, duration, description, location)
        }
        Some(Commands::Done { id }) => {
            init_stderr_logging();
            handle_done(id)
        }
        Some(Commands::Delete { id }) => {
            init_stderr_logging();
            handle_delete(id)
        }
        Some(Commands::Export { path }) => {
            init_stderr_logging();
            handle_export(path)
        }
        Some(Commands::Serve { port }) => {
            let _log_guard = init_file_logging();
            handle_serve(&config, port)
        }
        Some(Commands::Watch) => {
            let _log_guard = init_file_logging();
            handle_watch(&config)
        }
        Some(Commands::List { all }) => {
            init_stderr_logging();
            handle_list(all)
        }
        None => {
            init_stderr_logging();
            handle_list(false)
        }
    }
}

fn handle_add(
    name: String,
    date: Option<String>,
    time: Option<String>,
    duration: i64,
    description: Option<String>,
    location: Option<String>,
) -> Result<()> {
    if duration < 1 {
        bail!("Duration must be at least 1 hour");
    }

    let now = Local::now().naive_local();
    let date = date.unwrap_or_else(|| now.format(DATE_FORMAT).to_string());
    let time = time.unwrap_or_else(|| now.format(TIME_FORMAT).to_string());

    let mut task = Task::new(name, date, time, duration);
    task.start_timestamp()
        .context("Date must be dd/MM/yyyy and time HH:mm")?;
    task.description = description;
    task.location = location;

    let db = open_database()?;
    let id = db.insert_task(&task)?;
    println!("Created task {id}: {}", task.short_name);
    Ok(())
}

fn handle_list(all: bool) -> Result<()> {
    let db = open_database()?;

    // Reconcile first so a one-shot listing never shows stale statuses.
    reconcile(&db, &SystemClock)?;

    let mut tasks = if all {
        db.list_all_tasks()?
    } else {
        db.list_uncompleted_tasks()?
    };
    sort_for_display(&mut tasks);
    print_tasks(&tasks);
    Ok(())
}

fn handle_done(id: i64) -> Result<()> {
    let db = open_database()?;
    let Some(mut task) = db.get_task_by_id(id)? else {
        bail!("No task with id {id}");
    };

    task.status = TaskStatus::Completed;
    db.update_task(&task)?;
    println!("Completed task {id}: {}", task.short_name);
    Ok(())
}

fn handle_delete(id: i64) -> Result<()> {
    let db = open_database()?;
    let rows = db.delete_task_by_id(id)?;
    println!("Deleted {rows} row(s)");
    Ok(())
}

fn handle_export(path: Option<PathBuf>) -> Result<()> {
    let db = open_database()?;
    let path = match path {
        Some(p) => p,
        None => paths::get_default_export_path()?,
    };

    let count = export_tasks_to_html(&db, &path)?;
    println!("Exported {count} task(s) to {}", path.display());
    Ok(())
}

fn handle_serve(config: &Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.api_port);
    let worker_interval = Duration::from_secs(config.worker_interval_secs);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let db = Arc::new(open_database()?);
        let (notify_tx, _notify_rx) = watch::channel(0u64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let state = AppState {
            db: db.clone(),
            notifier: notify_tx.clone(),
        };

        let worker = tokio::spawn(monitor::status_worker(
            db,
            Arc::new(SystemClock),
            worker_interval,
            notify_tx,
            shutdown_rx,
        ));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("Failed to bind port {port}"))?;
        tracing::info!("API server listening on {}", listener.local_addr()?);

        axum::serve(listener, routes::create_router(state))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        let _ = shutdown_tx.send(true);
        let _ = worker.await;
        Ok(())
    })
}

fn handle_watch(config: &Config) -> Result<()> {
    let poll_interval = Duration::from_secs(config.poll_interval_secs);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let db = Arc::new(open_database()?);
        let (notify_tx, _notify_rx) = watch::channel(0u64);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let poll = tokio::spawn(monitor::poll_loop(
            db,
            Arc::new(SystemClock),
            poll_interval,
            notify_tx,
            shutdown_rx,
            StdoutSink,
        ));

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(true);
        poll.await??;
        Ok(())
    })
}

/// Presentation consumer for `watch`: reprints the whole list on refresh.
struct StdoutSink;

impl RefreshSink for StdoutSink {
    fn refresh(&mut self, tasks: &[Task]) {
        println!("\n--- {} ---", Local::now().format("%H:%M:%S"));
        print_tasks(tasks);
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    for task in tasks {
        let location = task
            .location
            .as_deref()
            .map(|l| format!(" @ {l}"))
            .unwrap_or_default();
        println!(
            "{:>4}  [{:<11}]  {} {}  {}h  {}{}",
            task.id,
            task.status,
            task.date,
            task.start_time,
            task.duration_hours,
            task.short_name,
            location
        );
    }
}
