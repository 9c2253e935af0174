use std::fs;
use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_dirs::AppDirs;

/// Anonymous local player identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl User {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 16] = rng.gen();
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let id = format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        );
        let suffix: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        Self {
            id,
            username: format!("User_{suffix}"),
        }
    }
}

pub trait IdentityStore {
    fn load(&self) -> Option<User>;
    fn save(&self, user: &User) -> std::io::Result<()>;

    /// The saved identity, or a freshly generated one that is saved for next time.
    fn load_or_create(&self) -> User {
        if let Some(user) = self.load() {
            return user;
        }
        let user = User::generate();
        info!(username = %user.username, "generated new user");
        if let Err(err) = self.save(&user) {
            tracing::warn!(%err, "could not save identity; it will not survive a restart");
        }
        user
    }
}

#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::identity_path().unwrap_or_else(|| PathBuf::from("motle_user.json")),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Option<User> {
        let bytes = fs::read(&self.path).ok()?;
        let user: User = serde_json::from_slice(&bytes).ok()?;
        if user.id.is_empty() || user.username.is_empty() {
            return None;
        }
        Some(user)
    }

    fn save(&self, user: &User) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(user)?)
    }
}
