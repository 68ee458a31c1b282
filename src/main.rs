use std::sync::Arc;

use bitsa_portal::{
    AppConfig, Env, FileStore, FixedAppearance, MockStorageService, Portal, S3StorageClient,
    StorageState,
    backend::{
        BackendState, create_router,
        error::BackendError,
        repository::{InMemoryRepository, RepositoryState},
        seed_admin,
    },
    error::{ConfigError, PersistError},
    filters::BlogFilter,
    form::SubmitOutcome,
    guard::{self, Access, Route},
    pages::{
        account::{LoginPage, NotificationCenter, RegisterPage, logout},
        admin::BlogAdminPage,
        public::{BlogListPage, EventsPage},
    },
    storage::StorageService,
    theme::ThemePreference,
    view::{ListRender, LoadState},
};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bitsa", version, about = "BITSA portal: local API server and command-line client")]
struct Cli {
    /// Overrides BITSA_API_URL for client commands.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the REST API on BITSA_BIND_ADDR.
    Serve,
    Register {
        name: String,
        email: String,
        password: String,
        #[arg(long)]
        course: Option<String>,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Show the stored session.
    Whoami,
    /// List approved blog posts.
    Blogs {
        #[arg(long)]
        keyword: Option<String>,
        /// Category name.
        #[arg(long)]
        category: Option<String>,
        /// Creation day, YYYY-MM-DD.
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Events,
    Notifications {
        /// Mark every notification as read.
        #[arg(long)]
        read_all: bool,
    },
    /// Show or change the display theme (light, dark, auto).
    Theme { preference: Option<ThemePreference> },
    /// Approve a pending blog post (admin only).
    Approve { id: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Rejected(String),
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            exit_on_config(e);
            return;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bitsa_portal=debug,bitsa=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn exit_on_config(e: ConfigError) {
    eprintln!("Configuration error: {}", e);
    std::process::exit(2);
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), CliError> {
    if let Command::Serve = cli.command {
        return serve(config).await;
    }

    let base_url = cli.api_url.unwrap_or_else(|| config.api_url.clone());
    let storage = Arc::new(FileStore::new(&config.data_dir));
    // A terminal has no system appearance to follow.
    let portal = Portal::new(base_url, storage, Arc::new(FixedAppearance(false)));

    match cli.command {
        Command::Serve => Ok(()),
        Command::Register {
            name,
            email,
            password,
            course,
        } => {
            let mut page = RegisterPage::new(portal.clone());
            page.form.fields.name = name;
            page.form.fields.email = email;
            page.form.fields.confirm_password = password.clone();
            page.form.fields.password = password;
            page.form.fields.course = course.unwrap_or_default();
            landed(&portal, page.submit().await)
        }
        Command::Login { email, password } => {
            let mut page = LoginPage::new(portal.clone());
            page.form.fields.email = email;
            page.form.fields.password = password;
            landed(&portal, page.submit().await)
        }
        Command::Logout => {
            logout(&portal);
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            match portal.session.user() {
                Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
                None => println!("Not logged in."),
            }
            Ok(())
        }
        Command::Blogs {
            keyword,
            category,
            date,
            limit,
        } => {
            let filter = BlogFilter {
                keyword: keyword.unwrap_or_default(),
                category: category.unwrap_or_default(),
                date: date.unwrap_or_default(),
                limit,
            };
            let mut page = BlogListPage::with_filter(portal, filter);
            page.apply_filters().await;
            check_loaded(page.blogs.state())?;
            let cards = page.cards();
            if cards.is_empty() {
                println!("No blog posts found.");
            }
            for card in cards {
                println!(
                    "{}  {}  by {} [{}]  likes {}  comments {}\n    {}",
                    card.published,
                    card.title,
                    card.author,
                    card.category.as_deref().unwrap_or("Uncategorised"),
                    card.likes,
                    card.comments,
                    card.excerpt
                );
            }
            Ok(())
        }
        Command::Events => {
            let mut page = EventsPage::new(portal);
            page.load().await;
            check_loaded(page.events.state())?;
            println!("Upcoming:");
            for event in page.upcoming() {
                println!("  {}  {}", event.date, event.title);
            }
            println!("Past:");
            for event in page.past() {
                println!("  {}  {}", event.date, event.title);
            }
            Ok(())
        }
        Command::Notifications { read_all } => {
            if !portal.session.is_authenticated() {
                return Err(CliError::Rejected("Please log in first.".to_string()));
            }
            let mut center = NotificationCenter::new(portal);
            center.load().await;
            if read_all {
                center.mark_all_read().await.map_err(CliError::Rejected)?;
            }
            check_loaded(center.notifications.state())?;
            println!("{} unread", center.unread_count());
            if let ListRender::Items(items) = center.notifications.render() {
                for n in items {
                    let marker = if n.is_read { " " } else { "*" };
                    println!("{} {}  ({})", marker, n.message, n.link);
                }
            }
            Ok(())
        }
        Command::Theme { preference } => {
            if let Some(preference) = preference {
                portal.theme.change(preference)?;
            }
            println!(
                "{} (applied: {})",
                portal.theme.preference(),
                portal.theme.resolved().as_str()
            );
            Ok(())
        }
        Command::Approve { id } => {
            if let Access::Redirect(to) = guard::check(&portal.session, &Route::AdminBlogs) {
                return Err(CliError::Rejected(format!(
                    "Admin access required (redirected to {}).",
                    to.path()
                )));
            }
            let mut page = BlogAdminPage::new(portal);
            page.approve(&id).await.map_err(CliError::Rejected)?;
            println!("Approved {}.", id);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), CliError> {
    tracing::info!("Application starting in {:?} mode", config.env);

    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;

    let storage: StorageState = match &config.s3 {
        Some(settings) => {
            let client = S3StorageClient::new(settings);
            if config.env == Env::Local {
                client.ensure_bucket_exists().await;
            }
            Arc::new(client)
        }
        None => {
            tracing::warn!("S3_ENDPOINT not set, uploads are kept in memory");
            Arc::new(MockStorageService::new())
        }
    };

    if let Some(seed) = &config.admin {
        seed_admin(&repo, seed, config.password_cost).await?;
    }

    let addr = config.bind_addr;
    let app = create_router(BackendState {
        repo,
        storage,
        config,
    });

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn landed(portal: &Portal, outcome: SubmitOutcome<Route>) -> Result<(), CliError> {
    match outcome {
        SubmitOutcome::Submitted(route) => {
            let name = portal.session.user().map(|u| u.name).unwrap_or_default();
            println!("Welcome, {}. Next stop: {}", name, route.path());
            Ok(())
        }
        SubmitOutcome::Invalid(message) | SubmitOutcome::Failed(message) => {
            Err(CliError::Rejected(message))
        }
    }
}

fn check_loaded(state: &LoadState) -> Result<(), CliError> {
    match state {
        LoadState::Failed(message) => Err(CliError::Rejected(message.clone())),
        _ => Ok(()),
    }
}
