//! Discord runtime adapter: commands, outbound messaging, and presence.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use poise::{
    CreateReply, Framework, FrameworkOptions, PrefixFrameworkOptions, builtins,
    serenity_prelude::{Cache, ChannelId, ClientBuilder, GatewayIntents, Http},
};

use crate::config::Config;
use crate::dispatch::{Command, Dispatcher, Messenger, PresenceProvider};
use crate::error::{BotError, Result};
use crate::store::{JsonFileBackend, PinglistStore};

pub struct Data {
    dispatcher: Dispatcher,
}

type Context<'a> = poise::Context<'a, Data, BotError>;
type CommandResult = std::result::Result<(), BotError>;

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    let store = PinglistStore::open(Box::new(JsonFileBackend::new(&config.db_path)))?;

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: pinglist_commands(),
            prefix_options: PrefixFrameworkOptions {
                prefix: Some("!".to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                let messenger = Arc::new(DiscordMessenger {
                    http: ctx.http.clone(),
                });
                let presence = Arc::new(DiscordPresence {
                    cache: ctx.cache.clone(),
                });
                Ok(Data {
                    dispatcher: Dispatcher::new(store, messenger, presence),
                })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

/// Sends dispatcher replies as plain channel messages, fire and forget.
struct DiscordMessenger {
    http: Arc<Http>,
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn send_message(&self, destination: &str, text: &str) {
        let Some(channel) = parse_channel_id(destination) else {
            warn!("Undeliverable reply, bad destination: {}", destination);
            return;
        };
        if let Err(e) = channel.say(&self.http, text).await {
            warn!("Failed to deliver reply to {}: {}", destination, e);
        }
    }
}

/// Reads channel membership out of the gateway cache.
struct DiscordPresence {
    cache: Arc<Cache>,
}

#[async_trait]
impl PresenceProvider for DiscordPresence {
    async fn current_nicks(&self, destination: &str) -> HashSet<String> {
        let Some(channel_id) = parse_channel_id(destination) else {
            return HashSet::new();
        };
        let channel = self.cache.guilds().into_iter().find_map(|guild_id| {
            self.cache
                .guild(guild_id)
                .and_then(|guild| guild.channels.get(&channel_id).cloned())
        });
        let Some(channel) = channel else {
            debug!("Channel {} not in cache, presence is empty", destination);
            return HashSet::new();
        };
        match channel.members(&self.cache) {
            Ok(members) => members
                .iter()
                .map(|member| member.display_name().to_string())
                .collect(),
            Err(e) => {
                warn!("Failed to read members of {}: {}", destination, e);
                HashSet::new()
            }
        }
    }
}

fn parse_channel_id(destination: &str) -> Option<ChannelId> {
    destination
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(ChannelId::new)
}

/// Splits a space-separated nick list; `None` means default to the caller.
fn split_nicks(nicks: Option<String>) -> Vec<String> {
    nicks
        .as_deref()
        .unwrap_or("")
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

/// Splits doping arguments into an optional channel-mention destination and
/// the ping message.
fn split_doping_rest(rest: &str) -> (Option<String>, String) {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");
    if let Some(id) = first
        .strip_prefix("<#")
        .and_then(|tail| tail.strip_suffix('>'))
        .filter(|id| id.chars().all(|c| c.is_ascii_digit()) && !id.is_empty())
    {
        let message = parts.next().unwrap_or("").trim().to_string();
        (Some(id.to_string()), message)
    } else {
        (None, rest.trim().to_string())
    }
}

/// All pinglist commands, for registration on both invocation surfaces.
#[must_use]
pub fn pinglist_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![
        add(),
        remove(),
        create(),
        delete(),
        show(),
        pinglists(),
        doping(),
    ]
}

async fn run_command(ctx: Context<'_>, command: Command) -> CommandResult {
    let caller = match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().display_name().to_string(),
    };
    let origin = ctx.channel_id().to_string();
    info!("{} invoked {:?} in channel {}", caller, command, origin);
    ctx.data().dispatcher.dispatch(command, &caller, &origin).await;

    // Slash invocations need an interaction response; the real replies went
    // through the messenger as plain channel messages.
    if matches!(ctx, poise::Context::Application(_)) {
        ctx.send(CreateReply::default().content("Done.").ephemeral(true))
            .await?;
    }
    Ok(())
}

/// Adds nicks to a ping list. Without nicks, adds the caller.
#[poise::command(prefix_command, slash_command, guild_only)]
async fn add(ctx: Context<'_>, listname: String, #[rest] nicks: Option<String>) -> CommandResult {
    run_command(
        ctx,
        Command::Add {
            listname,
            nicks: split_nicks(nicks),
        },
    )
    .await
}

/// Removes nicks from a ping list. Without nicks, removes the caller.
#[poise::command(prefix_command, slash_command, guild_only)]
async fn remove(
    ctx: Context<'_>,
    listname: String,
    #[rest] nicks: Option<String>,
) -> CommandResult {
    run_command(
        ctx,
        Command::Remove {
            listname,
            nicks: split_nicks(nicks),
        },
    )
    .await
}

/// Creates a new ping list, optionally seeded with nicks.
#[poise::command(prefix_command, slash_command, guild_only)]
async fn create(
    ctx: Context<'_>,
    listname: String,
    #[rest] nicks: Option<String>,
) -> CommandResult {
    run_command(
        ctx,
        Command::Create {
            listname,
            nicks: split_nicks(nicks),
        },
    )
    .await
}

/// Deletes a ping list.
#[poise::command(prefix_command, slash_command, guild_only)]
async fn delete(ctx: Context<'_>, listname: String) -> CommandResult {
    run_command(ctx, Command::Delete { listname }).await
}

/// Shows the members of a ping list.
#[poise::command(prefix_command, slash_command, guild_only)]
async fn show(ctx: Context<'_>, listname: String) -> CommandResult {
    run_command(ctx, Command::Show { listname }).await
}

/// Lists all ping lists.
#[poise::command(prefix_command, slash_command, guild_only)]
async fn pinglists(ctx: Context<'_>) -> CommandResult {
    run_command(ctx, Command::Pinglists).await
}

/// Pings every member of a list, optionally in another channel.
#[poise::command(prefix_command, slash_command, guild_only)]
async fn doping(ctx: Context<'_>, listname: String, #[rest] rest: String) -> CommandResult {
    let (destination, message) = split_doping_rest(&rest);
    run_command(
        ctx,
        Command::Doping {
            listname,
            destination,
            message,
        },
    )
    .await
}
