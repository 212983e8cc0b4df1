//! Command registry with optional JSON persistence.

use crate::error::StoreError;
use crate::types::CommandDefinition;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Snapshot format version.
const DATA_VERSION: u32 = 1;

/// Persistence contract for command definitions.
#[async_trait]
pub trait CommandRegistry: Send + Sync {
    /// Look up the definition of `command` in a conversation.
    async fn get(
        &self,
        token: &str,
        command: &str,
    ) -> Result<Option<CommandDefinition>, StoreError>;

    /// All definitions of a conversation, ordered by id.
    async fn list_all(&self, token: &str) -> Result<Vec<CommandDefinition>, StoreError>;

    /// Insert a definition, or replace the message of the existing one.
    async fn upsert(&self, definition: CommandDefinition)
        -> Result<CommandDefinition, StoreError>;

    /// Remove a definition. Returns whether it existed.
    async fn delete(&self, definition: &CommandDefinition) -> Result<bool, StoreError>;

    /// Increment the usage counter and return the new value.
    async fn increment_count(&self, definition: &CommandDefinition) -> Result<u64, StoreError>;
}

#[derive(Debug, Clone, Default)]
struct StoreData {
    next_id: u64,
    commands: HashMap<(String, String), CommandDefinition>,
}

/// On-disk representation.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    next_id: u64,
    commands: Vec<CommandDefinition>,
}

impl StoreData {
    fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        if snapshot.version != DATA_VERSION {
            return Err(StoreError::UnsupportedVersion(snapshot.version));
        }

        let max_id = snapshot.commands.iter().map(|c| c.id).max().unwrap_or(0);
        Ok(Self {
            next_id: snapshot.next_id.max(max_id + 1),
            commands: snapshot
                .commands
                .into_iter()
                .map(|c| (c.key(), c))
                .collect(),
        })
    }

    fn to_snapshot(&self) -> Snapshot {
        let mut commands: Vec<CommandDefinition> = self.commands.values().cloned().collect();
        commands.sort_by_key(|c| c.id);
        Snapshot {
            version: DATA_VERSION,
            next_id: self.next_id,
            commands,
        }
    }
}

/// Command registry kept in memory, optionally mirrored to a JSON file.
///
/// Every mutation holds the write lock until the snapshot is on disk, so
/// writes to the same key are serialized and a failed write leaves the
/// in-memory state untouched.
#[derive(Clone)]
pub struct CommandStore {
    data: Arc<RwLock<StoreData>>,
    path: Option<PathBuf>,
}

impl CommandStore {
    /// Create a store without persistence.
    pub fn memory() -> Self {
        Self {
            data: Arc::new(RwLock::new(StoreData {
                next_id: 1,
                commands: HashMap::new(),
            })),
            path: None,
        }
    }

    /// Open a store persisted at `path`, loading existing data.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let data = match fs::read(&path).await {
            Ok(bytes) => StoreData::from_snapshot(serde_json::from_slice(&bytes)?)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No command store at {:?}, starting empty", path);
                StoreData {
                    next_id: 1,
                    commands: HashMap::new(),
                }
            }
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} commands from {:?}", data.commands.len(), path);

        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            path: Some(path),
        })
    }

    /// Total number of stored commands across all conversations.
    pub async fn command_count(&self) -> usize {
        self.data.read().await.commands.len()
    }

    async fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(&data.to_snapshot())?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, path).await?;

        debug!("Saved {} commands to {:?}", data.commands.len(), path);
        Ok(())
    }
}

#[async_trait]
impl CommandRegistry for CommandStore {
    #[instrument(skip(self))]
    async fn get(
        &self,
        token: &str,
        command: &str,
    ) -> Result<Option<CommandDefinition>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .commands
            .get(&(token.to_string(), command.to_string()))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_all(&self, token: &str) -> Result<Vec<CommandDefinition>, StoreError> {
        let data = self.data.read().await;
        let mut commands: Vec<CommandDefinition> = data
            .commands
            .values()
            .filter(|c| c.token == token)
            .cloned()
            .collect();
        commands.sort_by_key(|c| c.id);
        Ok(commands)
    }

    #[instrument(skip(self, definition), fields(token = %definition.token, command = %definition.command))]
    async fn upsert(
        &self,
        definition: CommandDefinition,
    ) -> Result<CommandDefinition, StoreError> {
        let mut guard = self.data.write().await;
        let previous = guard.clone();
        let data = &mut *guard;

        let stored = match data.commands.get_mut(&definition.key()) {
            Some(existing) => {
                existing.set_message(&definition.message);
                existing.clone()
            }
            None => {
                let mut created = definition;
                created.id = data.next_id;
                created.count = 0;
                data.next_id += 1;
                data.commands.insert(created.key(), created.clone());
                created
            }
        };

        if let Err(e) = self.persist(&data).await {
            *data = previous;
            return Err(e);
        }

        info!("Stored command {} (id={})", stored.command, stored.id);
        Ok(stored)
    }

    #[instrument(skip(self, definition), fields(token = %definition.token, command = %definition.command))]
    async fn delete(&self, definition: &CommandDefinition) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;
        let previous = data.clone();

        let removed = data.commands.remove(&definition.key()).is_some();
        if !removed {
            return Ok(false);
        }

        if let Err(e) = self.persist(&data).await {
            *data = previous;
            return Err(e);
        }

        info!("Removed command {}", definition.command);
        Ok(true)
    }

    #[instrument(skip(self, definition), fields(token = %definition.token, command = %definition.command))]
    async fn increment_count(&self, definition: &CommandDefinition) -> Result<u64, StoreError> {
        let mut data = self.data.write().await;
        let previous = data.clone();

        let count = {
            let stored = data.commands.get_mut(&definition.key()).ok_or_else(|| {
                StoreError::NotFound {
                    token: definition.token.clone(),
                    command: definition.command.clone(),
                }
            })?;
            stored.count += 1;
            stored.updated_at = Utc::now();
            stored.count
        };

        if let Err(e) = self.persist(&data).await {
            *data = previous;
            return Err(e);
        }

        debug!("Count of {} is now {}", definition.command, count);
        Ok(count)
    }
}
