use std::io::{BufRead, Write};
use std::sync::Arc;

use alert_dashboard::config::Config;
use alert_dashboard::ui::terminal::build_frame;
use alert_dashboard::ui::toast::NotificationPresenter;
use alert_dashboard::{DashboardController, HttpGateway, UserAction};
use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "alert_dashboard")]
#[command(about = "Live security alerts dashboard", long_about = None)]
#[command(after_help = "Commands on stdin: filter <all|low|medium|high>, refresh, quit")]
struct Args {
    /// Verbose output (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Backend base URL (overrides env and config file)
    #[arg(long = "backend")]
    backend: Option<String>,

    /// Risk filter applied after the initial load
    #[arg(long = "filter")]
    filter: Option<String>,
}

/// Read line commands on a plain thread so a pending read never blocks runtime shutdown
fn spawn_stdin_reader(actions: mpsc::UnboundedSender<UserAction>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match UserAction::parse(&line) {
                Some(action) => {
                    if actions.send(action).is_err() {
                        break;
                    }
                }
                None => debug!("Ignoring input line: {:?}", line),
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let verbosity = args.verbose.min(3);
    Config::ensure_log_directory().ok();
    alert_dashboard::init_tracing(verbosity, Some(Config::log_file_path()));

    let config = Config::load(args.backend.as_deref())?;
    info!("alert-dashboard {} using backend {}", Config::version(), config.backend_url);

    let gateway = HttpGateway::new(&config.backend_url).context("Failed to create backend gateway")?;
    let notifier = NotificationPresenter::new(config.toast_timings);
    let mut dashboard = DashboardController::new(Arc::new(gateway), notifier);

    dashboard.start().await;
    if let Some(filter) = args.filter.as_deref() {
        dashboard.on_filter_changed(filter);
    }

    let (actions_tx, actions_rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(actions_tx.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = actions_tx.send(UserAction::Quit);
        }
    });

    dashboard
        .run(actions_rx, |view, toasts| {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "\n{}", build_frame(view, toasts));
            let _ = stdout.flush();
        })
        .await;

    dashboard.shutdown().await;
    Ok(())
}
