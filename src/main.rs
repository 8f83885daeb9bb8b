use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use folio::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    loaders::Loaders,
    local_store::{FileLocalStore, LocalStore},
    profile::{GithubClient, ProfileStatsWidget},
    runtime::{CrosstermEventSource, FixedTicker, Runner, Ticker, ZoneEvent, ZoneEventSource},
    server,
    visitor_client::VisitorClient,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::Path,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;
const RUNTIME_SHUTDOWN_MS: u64 = 250;

/// portfolio interactive zone in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Portfolio interactive zone: a visitor counter service, live profile stats with an XP level, a contribution heatmap, a 60 second typing test and a hidden key sequence."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// run the visitor counter service
    Serve {
        /// port to listen on
        #[clap(short, long, env = "FOLIO_PORT")]
        port: Option<u16>,
    },
    /// open the interactive zone (default)
    Zone(ZoneArgs),
    /// print the effective config
    Config {
        /// also write it to the config file
        #[clap(long)]
        write: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Zone(ZoneArgs::default())
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
struct ZoneArgs {
    /// profile handle whose stats are shown
    #[clap(long)]
    handle: Option<String>,

    /// skip the visitor counter and profile calls
    #[clap(long)]
    offline: bool,

    /// number of seconds per typing attempt
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// visitor counter endpoint
    #[clap(long)]
    visitors_url: Option<String>,
}

impl ZoneArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(handle) = &self.handle {
            config.handle = handle.clone();
        }
        if let Some(secs) = self.seconds {
            config.typing_duration_secs = secs;
        }
        if let Some(url) = &self.visitors_url {
            config.visitors_url = url.clone();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config_store = FileConfigStore::new();
    let mut config = config_store.load();

    match cli.command.unwrap_or_default() {
        Command::Serve { port } => {
            init_stderr_logging();
            let port = port.unwrap_or(config.port);
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            rt.block_on(server::start_server(port))?;
        }
        Command::Config { write } => {
            if write {
                config_store.save(&config)?;
                eprintln!("wrote {}", config_store.path().display());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Zone(args) => {
            if !stdin().is_tty() {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
            }
            args.apply(&mut config);
            init_file_logging(&AppDirs::log_path());
            run_zone(config, args.offline)?;
        }
    }

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

/// The zone owns the terminal, so its logs go to a file. No file, no logs.
fn init_file_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn run_zone(config: Config, offline: bool) -> Result<(), Box<dyn Error>> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let store: Arc<dyn LocalStore> = Arc::new(FileLocalStore::new());
    let github = GithubClient::new(&config.api_base, config.request_timeout())?;
    let widget = Arc::new(ProfileStatsWidget::new(
        github,
        &config.handle,
        Arc::clone(&store),
    ));
    let visitors = VisitorClient::new(&config.visitors_url, config.request_timeout())?;
    let mut app = App::new(
        config,
        widget.initial(),
        chrono::Local::now().date_naive(),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut loaders = if offline {
        app.go_offline();
        Loaders::idle()
    } else {
        Loaders::spawn(rt.handle(), visitors, widget, store, runner.sender())
    };
    info!(offline, handle = %app.config.handle, "zone opened");

    let result = start_tui(&mut terminal, &mut app, &runner);

    loaders.shutdown();
    app.teardown();
    drop(runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    rt.shutdown_timeout(Duration::from_millis(RUNTIME_SHUTDOWN_MS));
    info!("zone closed");

    result
}

fn start_tui<B: Backend, E: ZoneEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let size = terminal.size()?;
    app.handle_event(ZoneEvent::Resize(size.width, size.height), Instant::now());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        app.handle_event(event, Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
