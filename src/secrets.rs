use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

use crate::backend::SecretBackend;
use crate::error::PasskeepError;
use crate::identifier::SecretId;

#[cfg(unix)]
const SINK_MODE: u32 = 0o600;

/// Outcome of a failed secret operation. The first two are expected and
/// leave the caller free to carry on; `Internal` means the request itself failed.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret identifier already exists: {0}")]
    AlreadyExists(SecretId),

    #[error("No secret found with identifier: {0}")]
    NotFound(SecretId),

    #[error("Internal error. Please try again later.")]
    Internal(#[source] PasskeepError),
}

impl SecretError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    fn from_backend(err: PasskeepError, id: &SecretId) -> Self {
        match err {
            PasskeepError::AlreadyExists(_) => Self::AlreadyExists(id.clone()),
            PasskeepError::NotFound(_) => Self::NotFound(id.clone()),
            other => Self::Internal(other),
        }
    }
}

impl From<PasskeepError> for SecretError {
    fn from(err: PasskeepError) -> Self {
        Self::Internal(err)
    }
}

impl From<io::Error> for SecretError {
    fn from(err: io::Error) -> Self {
        Self::Internal(PasskeepError::Io(err))
    }
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    user_id: &'a str,
    password: &'a str,
}

/// The stored `{user_id, password}` pair, wiped from memory on drop.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

/// The four operations the interaction loop can ask for.
///
/// Every operation prints its own confirmation or failure line to `out`
/// and hands the classified result back to the caller.
pub struct SecretManager<B> {
    backend: B,
    output_file: PathBuf,
}

impl<B: SecretBackend> SecretManager<B> {
    pub fn new(backend: B, output_file: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_file: output_file.into(),
        }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Creates a new secret. An existing identifier is reported, never overwritten.
    pub fn store(
        &self,
        out: &mut dyn Write,
        id: &SecretId,
        user_id: &str,
        password: &SecretString,
    ) -> Result<(), SecretError> {
        let result = self.try_store(id, user_id, password);
        report(out, result, |out, _| writeln!(out, "\n✓ Secret saved."))
    }

    /// Lists every stored identifier, in backend order.
    pub fn list(&self, out: &mut dyn Write) -> Result<Vec<String>, SecretError> {
        let result = self
            .backend
            .list_secret_names()
            .map_err(SecretError::Internal);
        report(out, result, |out, names| {
            writeln!(out, "\n✓ {} secret(s) available", names.len())?;
            if !names.is_empty() {
                writeln!(out, "✓ {}", names.join(", "))?;
            }
            Ok(())
        })
    }

    /// Fetches a secret and overwrites the output file with it.
    pub fn retrieve(&self, out: &mut dyn Write, id: &SecretId) -> Result<PathBuf, SecretError> {
        let result = self.try_retrieve(id);
        report(out, result, |out, path| {
            writeln!(out, "\n✓ Secret stored in local file: {}", path.display())
        })
    }

    /// Permanently deletes a secret, checking first that it exists.
    pub fn delete(&self, out: &mut dyn Write, id: &SecretId) -> Result<(), SecretError> {
        let result = self.try_delete(id);
        report(out, result, |out, _| {
            writeln!(out, "\n✓ Deleted secret with identifier: {}", id)
        })
    }

    fn try_store(
        &self,
        id: &SecretId,
        user_id: &str,
        password: &SecretString,
    ) -> Result<(), SecretError> {
        if self
            .backend
            .secret_exists(id.as_str())
            .map_err(|e| SecretError::from_backend(e, id))?
        {
            return Err(SecretError::AlreadyExists(id.clone()));
        }

        let payload = Zeroizing::new(
            serde_json::to_string(&PayloadRef {
                user_id,
                password: password.expose_secret(),
            })
            .map_err(PasskeepError::from)?,
        );

        debug!(secret = %id, "creating secret");
        self.backend
            .create_secret(id.as_str(), &payload)
            .map_err(|e| SecretError::from_backend(e, id))
    }

    fn try_retrieve(&self, id: &SecretId) -> Result<PathBuf, SecretError> {
        let raw = Zeroizing::new(
            self.backend
                .get_secret_string(id.as_str())
                .map_err(|e| SecretError::from_backend(e, id))?,
        );
        let credentials: Credentials = serde_json::from_str(&raw).map_err(PasskeepError::from)?;

        let contents = Zeroizing::new(format!(
            "User ID: {}, Password: {}",
            credentials.user_id, credentials.password
        ));
        write_sink(&self.output_file, &contents)?;

        info!(secret = %id, path = %self.output_file.display(), "secret written to local file");
        Ok(self.output_file.clone())
    }

    fn try_delete(&self, id: &SecretId) -> Result<(), SecretError> {
        // The delete call itself may succeed for a missing name.
        if !self
            .backend
            .secret_exists(id.as_str())
            .map_err(|e| SecretError::from_backend(e, id))?
        {
            return Err(SecretError::NotFound(id.clone()));
        }

        debug!(secret = %id, "deleting secret");
        self.backend
            .delete_secret(id.as_str())
            .map_err(|e| SecretError::from_backend(e, id))
    }
}

/// Prints the success line via `success`, or the error's own message.
fn report<T>(
    out: &mut dyn Write,
    result: Result<T, SecretError>,
    success: impl FnOnce(&mut dyn Write, &T) -> io::Result<()>,
) -> Result<T, SecretError> {
    match result {
        Ok(value) => {
            success(out, &value)?;
            Ok(value)
        }
        Err(err) => {
            writeln!(out, "\n⚠️ {}", err)?;
            Err(err)
        }
    }
}

/// Truncates or creates `path`, owner read/write only.
fn write_sink(path: &Path, contents: &str) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(SINK_MODE);
    let mut file = options.open(path)?;

    // `mode` only applies when the file is created.
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(SINK_MODE))?;

    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(())
}
