mod analysis;
mod commands;
mod history;
mod llm;
mod location;
mod render;
mod requests;
mod state;

use std::collections::HashSet;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tokio::sync::RwLock;
use tracing::{error, info, Level};

use analysis::SymptomAnalyzer;
use history::HistoryStore;
use llm::GeminiClient;
use requests::RequestTracker;
use state::{AnalysisConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    // Load env
    let _ = dotenv::dotenv();
    let token = dotenv::var("DISCORD_TOKEN").map_err(|_| anyhow::anyhow!("DISCORD_TOKEN required"))?;
    let guild_id: Option<serenity::GuildId> = dotenv::var("DISCORD_GUILD_ID")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(serenity::GuildId::new);

    // Init storage
    let data_dir = std::path::PathBuf::from(
        dotenv::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
    )
    .join("history");
    let history = Arc::new(HistoryStore::new(&data_dir).await?);
    info!("History store initialized at {:?}", data_dir);

    // Init model client
    let gemini = Arc::new(GeminiClient::from_env()?);
    info!(model = gemini.model(), "Gemini client initialized");

    // Parse admin user IDs from env
    let admin_ids: HashSet<u64> = dotenv::var("ADMIN_USER_IDS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect();
    if !admin_ids.is_empty() {
        info!(count = admin_ids.len(), "Admin users configured");
    }

    let mut analysis_config = AnalysisConfig::default();
    if let Ok(language) = dotenv::var("DEFAULT_LANGUAGE") {
        if !language.trim().is_empty() {
            analysis_config.default_language = language.trim().to_string();
        }
    }
    let config = Arc::new(RwLock::new(analysis_config));

    let app_state = AppState {
        analyzer: Arc::new(SymptomAnalyzer::new(gemini)),
        history,
        requests: RequestTracker::new(),
        admin_ids,
        config,
    };

    let intents = serenity::GatewayIntents::GUILDS;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::symptom()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as: {} ({})", ready.user.name, ready.user.id);

                let commands = &framework.options().commands;
                info!("Registering {} top-level command(s):", commands.len());
                for cmd in commands {
                    info!("  /{} ({} subcommands)", cmd.name, cmd.subcommands.len());
                    for sub in &cmd.subcommands {
                        info!("    /{} {}", cmd.name, sub.name);
                    }
                }

                if let Some(gid) = guild_id {
                    info!("Registering to guild {} (instant)", gid);
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        gid,
                    )
                    .await?;
                } else {
                    info!("Registering globally (up to 1 hour delay)");
                    poise::builtins::register_globally(
                        ctx,
                        &framework.options().commands,
                    )
                    .await?;
                }

                Ok(app_state)
            })
        })
        .build();

    info!("Starting symptom bot...");

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}
