//! Anonymous identity persisted between runs.

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tally_core::user::UserId;

use crate::client::ApiClient;

/// `$HOME/.local/share/tally/session`, or `./tally-session` without `HOME`.
pub fn default_path() -> PathBuf {
  match std::env::var("HOME") {
    Ok(home) => PathBuf::from(home).join(".local/share/tally/session"),
    Err(_) => PathBuf::from("tally-session"),
  }
}

/// Resume the identity stored at `path` if the server still knows it,
/// otherwise sign in anonymously and store the new identity.
pub async fn establish(client: &ApiClient, path: &Path) -> Result<UserId> {
  if let Some(user) = load(path)?
    && client.user_exists(user).await?
  {
    return Ok(user);
  }
  let user = client.sign_in().await.context("anonymous sign-in failed")?;
  save(path, user)?;
  Ok(user)
}

/// The stored identity, or `None` if there is no usable session file.
fn load(path: &Path) -> Result<Option<UserId>> {
  match fs::read_to_string(path) {
    Ok(raw) => Ok(raw.parse().ok()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e).with_context(|| format!("reading session file {}", path.display())),
  }
}

fn save(path: &Path, user: UserId) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  fs::write(path, format!("{user}\n"))
    .with_context(|| format!("writing session file {}", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_is_no_session() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(load(&dir.path().join("session")).unwrap(), None);
  }

  #[test]
  fn garbage_file_is_no_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session");
    fs::write(&path, "not-a-uuid").unwrap();
    assert_eq!(load(&path).unwrap(), None);
  }

  #[test]
  fn saved_session_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/dir/session");
    let user = UserId::new_anonymous();
    save(&path, user).unwrap();
    assert_eq!(load(&path).unwrap(), Some(user));
  }
}
