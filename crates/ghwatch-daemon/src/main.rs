use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use ghwatch_core::settings::KEY_SHOW_INDICATOR;
use ghwatch_core::{Feed, SettingsStore};
use ghwatch_daemon::config::{DEFAULT_CONFIG_PATH, DaemonConfig};
use ghwatch_daemon::console::{Command, Console, Flow};
use ghwatch_daemon::{App, OncePoll, launcher, render_notification, status_line};
use ghwatch_github::PollTrigger;

#[derive(Parser, Debug)]
#[command(name = "ghwatch-daemon", about = "Watch a GitHub repository for new events")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Poll both feeds once, print what was found and exit
    #[arg(long)]
    once: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if std::env::var("GHWATCH_LOG_FORMAT").is_ok_and(|v| v == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let config = DaemonConfig::load(&args.config);
    let app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        },
    };

    tracing::info!(repo = %config.github.repo, "ghwatch starting");

    if args.once {
        return run_once(&app).await;
    }

    app.tray
        .set_activation_handler(Box::new(|url: &str| launcher::activate(url)));
    run_interactive(app).await;
    ExitCode::SUCCESS
}

async fn run_once(app: &App) -> ExitCode {
    let OncePoll {
        summary,
        notifications,
    } = app.run_once().await;
    for n in &notifications {
        println!("{}", render_notification(n));
    }
    for (feed, result) in [
        (Feed::Activity, &summary.activity),
        (Feed::IssueEvents, &summary.issue_events),
    ] {
        if let Err(e) = result {
            eprintln!("{feed}: {e}");
        }
    }
    if summary.failed_feeds().len() == Feed::ALL.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn run_interactive(app: App) {
    let scheduler = app.start();
    let console = Console::new(
        Arc::clone(&app.settings) as Arc<dyn SettingsStore>,
        Arc::clone(&app.tray),
    );

    // Renderer: print notifications as they land in the tray
    let mut added = app.tray.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match added.recv().await {
                Ok(n) => println!("{}", render_notification(&n)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer lagged behind notifications");
                },
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Status line after manual checks, when the indicator is on
    let mut completed = scheduler.subscribe();
    let settings = Arc::clone(&app.settings);
    let status = tokio::spawn(async move {
        loop {
            match completed.recv().await {
                Ok(done) => {
                    if done.trigger == PollTrigger::Manual && settings.get_bool(KEY_SHOW_INDICATOR)
                    {
                        println!("-- {}", status_line(&done));
                    }
                },
                Err(RecvError::Lagged(_)) => {},
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("ghwatch running; type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {e}");
                        break;
                    },
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    },
                };
                let (flow, output) = console.execute(command);
                if !output.is_empty() {
                    println!("{output}");
                }
                match flow {
                    Flow::Continue => {},
                    Flow::PollNow => {
                        if !scheduler.poll_now() {
                            tracing::error!("Scheduler is no longer running");
                            break;
                        }
                    },
                    Flow::Quit => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    scheduler.disable().await;
    app.tray.dismiss_all();
    renderer.abort();
    status.abort();
    tracing::info!("ghwatch stopped");
}
