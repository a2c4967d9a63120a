//! # Discord Transport
//!
//! Runs the reminder conversation in direct messages. Typed DMs become
//! [`InputEvent::Text`], button clicks become [`InputEvent::Selection`], and
//! every outgoing message (replies and fired reminders alike) is a DM.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use serenity::builder::CreateComponents;
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

use super::{InputEvent, Keyboard, NotificationSink};
use crate::core::chunk_for_message;
use crate::dispatcher::Dispatcher;
use crate::features::reminders::{Command, UserId};

/// Sends messages as DMs through the Discord REST API
#[derive(Clone)]
pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        DiscordSink { http }
    }

    async fn deliver(&self, user_id: UserId, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        let http: &Http = &self.http;
        let dm = serenity::model::id::UserId(user_id.0)
            .create_dm_channel(http)
            .await?;

        let chunks = chunk_for_message(text);
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            match keyboard {
                // Buttons go under the final piece
                Some(keyboard) if i == last => {
                    dm.send_message(http, |m| {
                        m.content(chunk).set_components(keyboard_components(keyboard))
                    })
                    .await?;
                }
                _ => {
                    dm.send_message(http, |m| m.content(chunk)).await?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    async fn send(&self, user_id: UserId, text: &str) -> Result<()> {
        self.deliver(user_id, text, None).await
    }

    async fn send_with_keyboard(&self, user_id: UserId, text: &str, keyboard: Keyboard) -> Result<()> {
        self.deliver(user_id, text, Some(keyboard)).await
    }
}

/// One action row with a button per keyboard command
pub fn keyboard_components(keyboard: Keyboard) -> CreateComponents {
    let mut components = CreateComponents::default();
    components.create_action_row(|row| {
        for command in keyboard.commands() {
            if let Some(id) = command.button_id() {
                let style = match command {
                    Command::AddReminder | Command::ListReminders => ButtonStyle::Primary,
                    Command::DeleteReminder => ButtonStyle::Danger,
                    _ => ButtonStyle::Secondary,
                };
                row.create_button(|btn| btn.custom_id(id).label(command.label()).style(style));
            }
        }
        row
    });
    components
}

/// Input event for a message, if the bot should react to it
///
/// Only direct messages from humans count.
pub fn text_event(author_id: u64, author_is_bot: bool, in_guild: bool, content: &str) -> Option<InputEvent> {
    if author_is_bot || in_guild {
        return None;
    }
    Some(InputEvent::Text {
        user_id: UserId(author_id),
        text: content.to_string(),
    })
}

/// Input event for a button click, if the button is one of ours
pub fn selection_event(user_id: u64, custom_id: &str) -> Option<InputEvent> {
    Command::from_button_id(custom_id).map(|command| InputEvent::Selection {
        user_id: UserId(user_id),
        command,
    })
}

/// Gateway event handler feeding the dispatcher
pub struct DiscordHandler {
    dispatcher: Arc<Dispatcher>,
}

impl DiscordHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        DiscordHandler { dispatcher }
    }
}

#[serenity::async_trait]
impl EventHandler for DiscordHandler {
    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(event) = text_event(
            msg.author.id.0,
            msg.author.bot,
            msg.guild_id.is_some(),
            &msg.content,
        ) else {
            return;
        };
        self.dispatcher.dispatch(event).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("🤖 Bot ID: {}", ready.user.id);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::MessageComponent(component) = interaction else {
            return;
        };

        let Some(event) = selection_event(component.user.id.0, &component.data.custom_id) else {
            warn!("Unknown button id '{}'", component.data.custom_id);
            return;
        };

        // Acknowledge by stripping the buttons so they can't be pressed twice
        if let Err(e) = component
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::UpdateMessage)
                    .interaction_response_data(|data| data.set_components(CreateComponents::default()))
            })
            .await
        {
            error!(
                "Failed to acknowledge button '{}': {}",
                component.data.custom_id, e
            );
        }

        debug!("Button '{}' pressed by {}", component.data.custom_id, component.user.id);
        self.dispatcher.dispatch(event).await;
    }
}
