//! Server configuration.

use std::{env, path::PathBuf};

/// Shortest accepted player name, in characters.
pub const MIN_NAME_LEN: usize = 2;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Environment variable overriding [`Settings::dumps_root`].
pub const DUMPS_ROOT_VAR: &str = "ROBOBATTLESHIP_DUMPS_ROOT";

/// Environment variable overriding [`Settings::admin_email`].
pub const ADMIN_EMAIL_VAR: &str = "ROBOBATTLESHIP_ADMIN_EMAIL";

const DEFAULT_DUMPS_ROOT: &str = "dumps";
const DEFAULT_ADMIN_EMAIL: &str = "admin@robobattleship.local";

/// Settings for a [`Server`](crate::Server).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    /// Directory state dumps are written to.
    pub dumps_root: PathBuf,
    /// Contact named in the message of unexpected errors.
    pub admin_email: String,
    pub min_name_len: usize,
    pub max_name_len: usize,
}

impl Settings {
    /// Default settings, overridden by any of the `ROBOBATTLESHIP_*` environment variables
    /// that are set and non-empty.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(root) = non_empty_var(DUMPS_ROOT_VAR) {
            settings.dumps_root = PathBuf::from(root);
        }
        if let Some(email) = non_empty_var(ADMIN_EMAIL_VAR) {
            settings.admin_email = email;
        }
        settings
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dumps_root: PathBuf::from(DEFAULT_DUMPS_ROOT),
            admin_email: DEFAULT_ADMIN_EMAIL.to_owned(),
            min_name_len: MIN_NAME_LEN,
            max_name_len: MAX_NAME_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.dumps_root, PathBuf::from("dumps"));
        assert_eq!((settings.min_name_len, settings.max_name_len), (2, 50));
    }

    #[test]
    fn environment_overrides() {
        env::set_var(DUMPS_ROOT_VAR, "/var/lib/robobattleship");
        env::set_var(ADMIN_EMAIL_VAR, "  ");
        let settings = Settings::from_env();
        env::remove_var(DUMPS_ROOT_VAR);
        env::remove_var(ADMIN_EMAIL_VAR);
        assert_eq!(settings.dumps_root, PathBuf::from("/var/lib/robobattleship"));
        assert_eq!(settings.admin_email, DEFAULT_ADMIN_EMAIL);
    }
}
