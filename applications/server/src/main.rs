/// Chorus Server - collaborative playlists with live updates
use chorus_core::{CollectionStore, CreateSong, CreateUser, Principal, UserId};
use chorus_server::{
    api,
    config::{EventBackend, ServerConfig},
    events::{BrokerEventBus, EventBus, InProcessEventBus},
    services::AuthService,
    state::AppState,
};
use chorus_storage::{SqliteBroker, SqliteStore};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chorus-server")]
#[command(about = "Chorus collaborative playlist server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// List all users
    ListUsers,
    /// Mint an access token for an existing user (development helper)
    IssueToken {
        #[arg(long)]
        user_id: String,
    },
    /// Register song metadata
    AddSong {
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        /// Duration in seconds
        #[arg(long)]
        duration: i64,
        #[arg(long)]
        file_id: String,
        #[arg(long)]
        uploaded_by: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorus_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            username,
            email,
            first_name,
            last_name,
        } => {
            add_user(
                &config,
                CreateUser {
                    username,
                    email,
                    first_name,
                    last_name,
                },
            )
            .await?;
        }
        Commands::ListUsers => list_users(&config).await?,
        Commands::IssueToken { user_id } => issue_token(&config, &user_id).await?,
        Commands::AddSong {
            title,
            artist,
            duration,
            file_id,
            uploaded_by,
        } => {
            let input = chorus_core::requests::CreateSongInput {
                title,
                artist,
                duration,
                file_id,
            };
            add_song(&config, input, &uploaded_by).await?;
        }
    }

    Ok(())
}

async fn open_store(config: &ServerConfig) -> anyhow::Result<(sqlx::SqlitePool, SqliteStore)> {
    let pool = chorus_storage::create_pool(&config.storage.database_url).await?;
    chorus_storage::run_migrations(&pool).await?;
    Ok((pool.clone(), SqliteStore::new(pool)))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Chorus Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let (pool, store) = open_store(&config).await?;
    let store: Arc<dyn CollectionStore> = Arc::new(store);
    tracing::info!("Database connected");

    let auth_service = Arc::new(AuthService::new(
        &config.auth.jwt_secret,
        config.auth.jwt_expiration_hours,
    ));

    let bus: Arc<dyn EventBus> = match config.events.backend {
        EventBackend::InProcess => {
            tracing::info!("Using in-process event bus");
            Arc::new(InProcessEventBus::new())
        }
        EventBackend::Broker => {
            let broker = Arc::new(SqliteBroker::new(pool, config.events.poll_interval()));
            spawn_outbox_pruning(Arc::clone(&broker), config.events.retention());
            tracing::info!(
                poll_interval_ms = config.events.broker_poll_interval_ms,
                "Using broker-backed event bus"
            );
            Arc::new(BrokerEventBus::new(broker))
        }
    };

    let app_state = AppState::new(store, auth_service, bus);
    let app = api::create_router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn spawn_outbox_pruning(broker: Arc<SqliteBroker>, retention: std::time::Duration) {
    let Ok(max_age) = chrono::Duration::from_std(retention) else {
        tracing::warn!("Outbox retention out of range, pruning disabled");
        return;
    };

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(retention / 2);
        loop {
            interval.tick().await;
            match broker.prune(chrono::Utc::now() - max_age).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Pruned broker outbox"),
                Err(e) => tracing::warn!(error = %e, "Failed to prune broker outbox"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn add_user(config: &ServerConfig, user: CreateUser) -> anyhow::Result<()> {
    let (_, store) = open_store(config).await?;
    let user = store.create_user(user).await?;
    println!("Created user {} ({})", user.username, user.id);
    Ok(())
}

async fn list_users(config: &ServerConfig) -> anyhow::Result<()> {
    let (_, store) = open_store(config).await?;
    let users = store.get_all_users().await?;

    println!("Users:");
    for user in users {
        println!("  {} - {} <{}>", user.id, user.username, user.email);
    }

    Ok(())
}

async fn issue_token(config: &ServerConfig, user_id: &str) -> anyhow::Result<()> {
    config.validate()?;
    let (_, store) = open_store(config).await?;

    let user_id = chorus_core::requests::validate_user_id(user_id)?;
    let user = store
        .get_user(&user_id)
        .await?
        .filter(|u| u.is_active())
        .ok_or_else(|| anyhow::anyhow!("No active user with id {user_id}"))?;

    let auth_service = AuthService::new(&config.auth.jwt_secret, config.auth.jwt_expiration_hours);
    let token = auth_service.create_access_token(&Principal::new(user.id, user.email))?;
    println!("{token}");
    Ok(())
}

async fn add_song(
    config: &ServerConfig,
    input: chorus_core::requests::CreateSongInput,
    uploaded_by: &str,
) -> anyhow::Result<()> {
    let (_, store) = open_store(config).await?;
    let request = input.validate()?;
    let uploaded_by: UserId = chorus_core::requests::validate_user_id(uploaded_by)?;

    let song = store
        .create_song(CreateSong {
            title: request.title,
            artist: request.artist,
            duration_secs: request.duration_secs,
            file_id: request.file_id,
            uploaded_by,
        })
        .await?;
    println!("Created song {} ({})", song.title, song.id);
    Ok(())
}
