use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use wifi_sentry::cli::{Action, Args};
use wifi_sentry::config::{Config, NotificationSettings};
use wifi_sentry::database::models::SESSION_NONE;
use wifi_sentry::database::repositories::AttemptRepository;
use wifi_sentry::database;
use wifi_sentry::notification::{NotificationEvent, Notifier};
use wifi_sentry::portal::{HttpTransport, LoginService};
use wifi_sentry::probe::ConnectivityProbe;
use wifi_sentry::secrets::{DEFAULT_KEY_PATH, SecretStore};
use wifi_sentry::{Error, Result, logging, setup};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let _guard = logging::init(args.log_dir.as_deref(), args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("❌ {e}");
        if matches!(e, Error::ConfigMissing { .. }) {
            eprintln!("💡 Run 'wifi-sentry --setup' to configure the application.");
            eprintln!("📖 Or copy config.example.json to config.json and edit it manually.");
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let secrets = SecretStore::open(Path::new(DEFAULT_KEY_PATH))?;

    // Actions that work without a configuration file.
    match args.action() {
        Action::Setup => return setup::run_wizard(&args.config, &secrets),
        Action::TestNotify => return test_notify().await,
        _ => {}
    }

    let mut config = Config::load(&args.config, &secrets)?;
    if args.no_notify {
        config.notifications.enabled = false;
    }

    match args.action() {
        Action::Login => {
            login(&config, &secrets).await?;
            Ok(())
        }
        Action::ViewLogs(limit) => {
            let repository = open_repository(&config).await?;
            view_logs(&repository, limit).await
        }
        Action::Test => test_connection(&config).await,
        Action::ClearLogs(days) => {
            let repository = open_repository(&config).await?;
            clear_logs(&repository, days).await
        }
        Action::Default => {
            let repository = login(&config, &secrets).await?;
            view_logs(&repository, 1).await
        }
        Action::Setup | Action::TestNotify => unreachable!("handled above"),
    }
}

async fn open_repository(config: &Config) -> Result<AttemptRepository> {
    let pool = database::init_pool(&database::database_url(&config.db_name)).await?;
    database::run_migrations(&pool).await?;
    Ok(AttemptRepository::new(pool))
}

async fn login(config: &Config, secrets: &SecretStore) -> Result<AttemptRepository> {
    if !config.is_configured() {
        return Err(Error::config(
            "configuration still contains placeholder credentials; run 'wifi-sentry --setup' first",
        ));
    }

    let repository = open_repository(config).await?;
    let notifier = Notifier::new(config.notifications.clone());
    let transport = Arc::new(HttpTransport::new()?);
    let service = LoginService::new(
        config.clone(),
        secrets.clone(),
        repository.clone(),
        notifier,
        transport,
    );

    if !service.run_with_retries().await {
        println!("⚠️ Login did not succeed; see the attempt log for details.");
    }
    Ok(repository)
}

async fn view_logs(repository: &AttemptRepository, limit: u32) -> Result<()> {
    let records = repository.recent(limit).await?;
    if records.is_empty() {
        println!("No login attempts found in the database.");
        return Ok(());
    }

    println!("Recent login attempts (newest first):");
    println!("{}", "=".repeat(80));
    for record in records {
        let session = if record.a.is_empty() {
            SESSION_NONE
        } else {
            record.a.as_str()
        };
        println!("Time: {}", record.timestamp);
        println!("Username: {}", record.username);
        println!("Session ID (a): {session}");
        println!("Status: {}", record.response_status);
        println!("Message: {}", record.response_message);
        println!(
            "Notified: {}",
            if record.notification_was_sent() { "yes" } else { "no" }
        );
        println!("{}", "-".repeat(80));
    }
    Ok(())
}

async fn clear_logs(repository: &AttemptRepository, days: Option<u32>) -> Result<()> {
    match days {
        Some(days) => {
            let deleted = repository.prune_older_than(days).await?;
            println!("✅ Deleted {deleted} login attempts older than {days} days.");
        }
        None => {
            let deleted = repository.clear_all().await?;
            println!("✅ All {deleted} login attempts have been cleared.");
        }
    }
    Ok(())
}

async fn test_connection(config: &Config) -> Result<()> {
    if config.wifi_url.is_empty() {
        return Err(Error::config("no wifi_url configured; run 'wifi-sentry --setup' first"));
    }

    let probe = ConnectivityProbe::default();
    let online = probe.is_online().await;
    println!(
        "🌐 Internet connectivity: {}",
        if online { "online" } else { "offline" }
    );

    println!("🔗 Testing connection to {}...", config.wifi_url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| Error::Other(format!("failed to build HTTP client: {e}")))?;

    match client.head(&config.wifi_url).send().await {
        Ok(response) if response.status().as_u16() == 200 => {
            println!(
                "✅ Connection successful! The server responded with status {}.",
                response.status().as_u16()
            );
        }
        Ok(response) => {
            println!(
                "⚠️ Connection successful, but the server responded with status {}.",
                response.status().as_u16()
            );
        }
        Err(e) => {
            println!("❌ Connection failed: {e}");
        }
    }
    Ok(())
}

async fn test_notify() -> Result<()> {
    let notifier = Notifier::new(NotificationSettings::default());
    if notifier.notify(&NotificationEvent::Test).await {
        println!("✅ Test notification dispatched.");
    } else {
        println!("⚠️ Test notification was suppressed.");
    }
    Ok(())
}
