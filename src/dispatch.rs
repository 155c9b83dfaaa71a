//! Typed command execution against the store and resolver.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::error::{BotError, Result};
use crate::resolver::resolve;
use crate::store::PinglistStore;
use crate::wrap::wrap_reply;

/// Fire-and-forget outbound messaging, provided by the chat runtime.
///
/// Implementations swallow delivery failures; the dispatcher never waits on
/// delivery confirmation.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, destination: &str, text: &str);
}

/// Point-in-time view of the nicks visible at a destination.
#[async_trait]
pub trait PresenceProvider: Send + Sync {
    async fn current_nicks(&self, destination: &str) -> HashSet<String>;
}

/// One fully-parsed command invocation.
///
/// Argument parsing happens in the runtime adapter; the dispatcher only sees
/// these typed records.
#[derive(Debug, Clone)]
pub enum Command {
    Create {
        listname: String,
        nicks: Vec<String>,
    },
    Delete {
        listname: String,
    },
    Add {
        listname: String,
        nicks: Vec<String>,
    },
    Remove {
        listname: String,
        nicks: Vec<String>,
    },
    Show {
        listname: String,
    },
    Pinglists,
    Doping {
        listname: String,
        destination: Option<String>,
        message: String,
    },
}

/// Stateless request/response bridge between commands and the store.
///
/// Every outcome, success or failure, is reported as reply lines through the
/// messenger; errors never propagate past [`Dispatcher::dispatch`].
pub struct Dispatcher {
    store: PinglistStore,
    messenger: Arc<dyn Messenger>,
    presence: Arc<dyn PresenceProvider>,
}

impl Dispatcher {
    pub fn new(
        store: PinglistStore,
        messenger: Arc<dyn Messenger>,
        presence: Arc<dyn PresenceProvider>,
    ) -> Self {
        Self {
            store,
            messenger,
            presence,
        }
    }

    /// Executes one command on behalf of `caller`, replying at `origin`.
    pub async fn dispatch(&self, command: Command, caller: &str, origin: &str) {
        debug!("Dispatching {:?} for {} at {}", command, caller, origin);
        if let Err(e) = self.execute(command, caller, origin).await {
            warn!("Command from {} failed: {}", caller, e);
            self.reply(origin, caller, &e.user_message()).await;
        }
    }

    async fn execute(&self, command: Command, caller: &str, origin: &str) -> Result<()> {
        match command {
            Command::Create { listname, nicks } => {
                // Unlike add/remove, no nicks means an empty list, not the caller.
                let seed: BTreeSet<String> = nicks.into_iter().collect();
                self.store.create(&listname, seed).await?;
                info!("{} created ping list {}", caller, listname);
                self.reply(origin, caller, &format!("Pinglist {listname} added."))
                    .await;
            }
            Command::Delete { listname } => {
                self.store.delete(&listname).await?;
                info!("{} deleted ping list {}", caller, listname);
                self.reply(origin, caller, &format!("Pinglist {listname} deleted."))
                    .await;
            }
            Command::Add { listname, nicks } => {
                let nicks = nicks_or_caller(nicks, caller);
                self.store.add_members(&listname, &nicks).await?;
                self.reply(origin, caller, "Nick(s) successfully added.").await;
            }
            Command::Remove { listname, nicks } => {
                let nicks = nicks_or_caller(nicks, caller);
                self.store.remove_members(&listname, &nicks).await?;
                self.reply(origin, caller, "Nick(s) successfully removed.").await;
            }
            Command::Show { listname } => {
                let members = self.store.get(&listname).await?;
                self.reply(origin, caller, &format!("Members of {listname}: "))
                    .await;
                let joined = members.into_iter().collect::<Vec<_>>().join(" ");
                self.send_wrapped(origin, &joined).await;
            }
            Command::Pinglists => {
                self.reply(origin, caller, "Current ping lists: ").await;
                let joined = self.store.list_names().await.join(" ");
                self.send_wrapped(origin, &joined).await;
            }
            Command::Doping {
                listname,
                destination,
                message,
            } => {
                let target = destination.unwrap_or_else(|| origin.to_string());
                let members = self.store.get(&listname).await?;
                if members.is_empty() {
                    return Err(BotError::ListEmpty(listname));
                }
                let present = self.presence.current_nicks(&target).await;
                let resolved = resolve(&members, &present);
                info!(
                    "{} pinged {} nick(s) from {} at {} ({})",
                    caller,
                    resolved.len(),
                    listname,
                    target,
                    message
                );
                self.send_wrapped(&target, &resolved.join(" ")).await;
            }
        }
        Ok(())
    }

    async fn reply(&self, destination: &str, caller: &str, text: &str) {
        self.messenger
            .send_message(destination, &format!("{caller}: {text}"))
            .await;
    }

    async fn send_wrapped(&self, destination: &str, text: &str) {
        for line in wrap_reply(text) {
            self.messenger.send_message(destination, &line).await;
        }
    }
}

/// Defaults to the caller's own nick when no nicks were supplied. Applies to
/// add and remove only; create seeds exactly what it was given.
fn nicks_or_caller(nicks: Vec<String>, caller: &str) -> BTreeSet<String> {
    if nicks.is_empty() {
        BTreeSet::from([caller.to_string()])
    } else {
        nicks.into_iter().collect()
    }
}
