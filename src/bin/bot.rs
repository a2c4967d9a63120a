use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::http::Http;
use serenity::prelude::*;
use std::sync::Arc;

use reminder_bot::core::Config;
use reminder_bot::dispatcher::Dispatcher;
use reminder_bot::features::reminders::{
    ConversationStateMachine, ReminderScheduler, ReminderStore,
};
use reminder_bot::transport::discord::{DiscordHandler, DiscordSink};
use reminder_bot::transport::NotificationSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting reminder bot...");
    info!(
        "Limits: {} reminders per user, {} pending overall",
        config.reminders.max_reminders_per_user, config.reminders.max_pending_reminders
    );

    // Scheduled tasks deliver through their own REST client
    let http = Arc::new(Http::new(&config.discord_token));
    let sink: Arc<dyn NotificationSink> = Arc::new(DiscordSink::new(http));

    let store = ReminderStore::new(config.reminders.max_reminders_per_user);
    let scheduler = ReminderScheduler::new(
        store.clone(),
        Arc::clone(&sink),
        config.reminders.max_pending_reminders,
    );
    let machine = ConversationStateMachine::new(store, scheduler);
    let dispatcher = Arc::new(Dispatcher::new(machine, sink));

    let intents = GatewayIntents::DIRECT_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(DiscordHandler::new(dispatcher))
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    if let Err(e) = client.start().await {
        error!("Client error: {e}");
        return Err(anyhow::anyhow!("Client error: {}", e));
    }

    Ok(())
}
