use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::commands::utils;
use webpresenter::daemon::{Daemon, DaemonClient, DaemonRequest, DaemonResponse};

#[derive(Subcommand)]
pub enum DaemonCommands {
    /// Run the daemon (in foreground)
    Run,

    /// Start the daemon in the background
    Start,

    /// Stop the daemon
    Stop,

    /// Check daemon status
    Status,
}

pub async fn handle_daemon(command: DaemonCommands, store_path: Option<PathBuf>) -> Result<()> {
    match command {
        DaemonCommands::Run => {
            if Daemon::is_running() {
                println!("Daemon is already running");
            } else {
                let store = utils::open_store(store_path)?;
                println!("Starting daemon with store {}...", store.path().display());
                let mut daemon = Daemon::new(store);
                daemon.start().await?;
            }
        }
        DaemonCommands::Start => {
            if Daemon::is_running() {
                println!("Daemon is already running");
            } else {
                start_background(store_path)?;
            }
        }
        DaemonCommands::Stop => {
            if DaemonClient::is_daemon_running() {
                match DaemonClient::send_request(DaemonRequest::Shutdown) {
                    Ok(_) => println!("Daemon stopped"),
                    Err(e) => println!("Failed to stop daemon: {}", e),
                }
            } else {
                println!("Daemon is not running");
            }
        }
        DaemonCommands::Status => {
            if DaemonClient::is_daemon_running() {
                match DaemonClient::send_request(DaemonRequest::Ping) {
                    Ok(DaemonResponse::Pong) => {
                        println!("Daemon is running");
                        if let Ok(DaemonResponse::Slides(slides)) =
                            DaemonClient::send_request(DaemonRequest::GetSlides)
                        {
                            println!("Stored slides: {}", slides.len());
                        }
                    }
                    _ => println!("Daemon is not responding properly"),
                }
            } else {
                println!("Daemon is not running");
            }
        }
    }
    Ok(())
}

/// Re-run this executable as `daemon run` with output sent to a log file
fn start_background(store_path: Option<PathBuf>) -> Result<()> {
    use std::process::{Command, Stdio};

    println!("Starting daemon in background...");
    let log_dir = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
    let log_file = log_dir.join("webpresenter-daemon.log");
    let log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let mut command = Command::new(std::env::current_exe()?);
    if let Some(path) = &store_path {
        command.arg("--store").arg(path);
    }
    let child = command
        .arg("daemon")
        .arg("run")
        .stdin(Stdio::null())
        .stdout(log.try_clone()?)
        .stderr(log)
        .spawn()?;
    std::mem::forget(child);

    let mut daemon_started = false;
    for _ in 0..10 {
        std::thread::sleep(std::time::Duration::from_millis(500));
        if Daemon::is_running() {
            daemon_started = true;
            break;
        }
    }

    if daemon_started {
        println!("Daemon started successfully");
        println!("Log file: {}", log_file.display());
        Ok(())
    } else {
        anyhow::bail!(
            "Failed to start daemon. Check log file: {}",
            log_file.display()
        )
    }
}
