// neetsync command line.
// Authorization, repository binding, stats, and one-shot pushes from local files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use neetsync::app::{Engine, github_connector};
use neetsync::config::{Config, ConfigState};
use neetsync::github::GitHubClient;
use neetsync::lifecycle::Lifecycle;
use neetsync::notice::ConsoleNotifier;
use neetsync::page::{EditorEngine, EditorModel, Node, StaticPage, selectors};
use neetsync::storage::{self, FileStorage, Storage};
use neetsync::{auth, session, stats};

#[derive(Parser)]
#[command(name = "neetsync")]
#[command(version)]
#[command(about = "Sync solved NeetCode problems into a GitHub repository")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "NEETSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the session and problem cache
    #[arg(long, env = "NEETSYNC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the URL that starts GitHub authorization
    AuthorizeUrl {
        #[arg(long)]
        redirect_uri: String,
    },

    /// Store credentials from a token or an authorization code
    Login {
        /// Personal access token
        #[arg(long, conflicts_with = "code")]
        token: Option<String>,

        /// Authorization code, or the full redirect URL carrying it
        #[arg(long, requires = "redirect_uri")]
        code: Option<String>,

        #[arg(long)]
        redirect_uri: Option<String>,
    },

    /// Forget the stored credentials and repository
    Logout,

    /// Bind the target repository
    Repo { name: String },

    /// Show the session and solved counts
    Status,

    /// Capture a solution from local files and push it
    Push {
        /// Problem location, absolute or relative to the site
        #[arg(long)]
        url: String,

        /// Source file with the solution
        #[arg(long)]
        code: PathBuf,

        #[arg(long)]
        title: Option<String>,

        /// Difficulty text as shown on the page
        #[arg(long)]
        difficulty: Option<String>,

        /// HTML file with the problem statement
        #[arg(long)]
        statement: Option<PathBuf>,

        /// Editor language id, e.g. python3
        #[arg(long)]
        language: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("neetsync={}", log_level).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_state = load_config(cli.config.as_deref())?;
    let config = config_state.get()?;
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => storage::data_dir().context("could not determine a data directory")?,
    };
    let store = Arc::new(FileStorage::new(data_dir));

    match cli.command {
        Commands::AuthorizeUrl { redirect_uri } => {
            println!("{}", auth::authorize_url(&config, &redirect_uri)?);
        }
        Commands::Login {
            token,
            code,
            redirect_uri,
        } => {
            let session = match (token, code, redirect_uri) {
                (Some(token), _, _) => auth::store_token(&config, store.as_ref(), &token).await?,
                (None, Some(code), Some(redirect_uri)) => {
                    let code = if code.contains("://") {
                        auth::code_from_redirect(&code)?
                    } else {
                        code
                    };
                    auth::complete_login(&config, store.as_ref(), &code, &redirect_uri).await?
                }
                _ => bail!("pass --token, or --code with --redirect-uri"),
            };
            println!("Logged in as {}", session.login);
        }
        Commands::Logout => {
            session::deauthorize(store.as_ref())?;
            println!("Logged out");
        }
        Commands::Repo { name } => {
            let session = session::bind_repo(store.as_ref(), &name)?;
            println!(
                "Repository set to {}/{}",
                session.login,
                session.repo_name.unwrap_or_default()
            );
        }
        Commands::Status => show_status(&config, store.as_ref()).await?,
        Commands::Push {
            url,
            code,
            title,
            difficulty,
            statement,
            language,
        } => {
            let href = resolve_href(&config.site_base, &url)?;
            let page = build_page(
                &href,
                &code,
                title,
                difficulty,
                statement.as_deref(),
                language,
            )?;

            let engine = Engine::new(
                Arc::new(page),
                store,
                Lifecycle::new(),
                config.timings.clone(),
                github_connector(config.api_base.clone()),
                Arc::new(ConsoleNotifier),
            );
            // Failures were already reported through the notifier.
            let Ok(report) = engine.push().await else {
                std::process::exit(1);
            };
            for file in report.files {
                println!("  {:?} {}", file.outcome, file.path);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ConfigState> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => storage::config_path(),
    };
    let config = match path {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    Ok(ConfigState::ready(config))
}

async fn show_status(config: &Config, store: &dyn Storage) -> Result<()> {
    let Some(session) = session::load(store).filter(|s| s.is_authenticated()) else {
        println!("Not logged in");
        return Ok(());
    };
    println!("Logged in as {}", session.login);

    let Ok(target) = session.target() else {
        println!("No repository bound");
        return Ok(());
    };
    println!("Repository: {}/{}", target.owner, target.repo);

    let client = GitHubClient::with_base(target.token, &config.api_base)?;
    let solved = stats::solved_stats(&client, &target).await?;
    println!(
        "Solved: {} (Easy {}, Medium {}, Hard {})",
        solved.total(),
        solved.easy,
        solved.medium,
        solved.hard
    );
    Ok(())
}

fn resolve_href(site_base: &str, location: &str) -> Result<String> {
    let base = url::Url::parse(site_base).context("invalid site_base")?;
    let href = base
        .join(location)
        .with_context(|| format!("invalid problem location: {}", location))?;
    Ok(href.to_string())
}

fn build_page(
    href: &str,
    code: &Path,
    title: Option<String>,
    difficulty: Option<String>,
    statement: Option<&Path>,
    language: Option<String>,
) -> Result<StaticPage> {
    let source = fs::read_to_string(code)
        .with_context(|| format!("failed to read {}", code.display()))?;

    let mut page = StaticPage::new(href).with_editor(
        EditorEngine::CodeMirror,
        EditorModel {
            value: source,
            language,
        },
    );
    if let Some(title) = title {
        page = page.with_node(selectors::TITLE[0], Node::text(title));
    }
    if let Some(difficulty) = difficulty {
        page = page.with_node(selectors::DIFFICULTY_INDICATORS[0], Node::text(difficulty));
    }
    if let Some(path) = statement {
        let html = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        page = page.with_node(selectors::STATEMENT, Node::html(html));
    }
    Ok(page)
}
