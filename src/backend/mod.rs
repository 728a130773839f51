pub mod aws;
#[cfg(test)]
pub mod memory;

use crate::error::PasskeepError;

pub type Result<T> = std::result::Result<T, PasskeepError>;

/// Remote secret storage. The adapter talks to the service only through this trait.
///
/// Implementations must report a duplicate name as [`PasskeepError::AlreadyExists`]
/// and a missing name as [`PasskeepError::NotFound`].
pub trait SecretBackend {
    fn create_secret(&self, name: &str, secret_string: &str) -> Result<()>;

    /// Every stored name, in the order the service returns them.
    fn list_secret_names(&self) -> Result<Vec<String>>;

    fn get_secret_string(&self, name: &str) -> Result<String>;

    fn secret_exists(&self, name: &str) -> Result<bool>;

    /// Permanently deletes `name`, skipping any recovery window.
    /// Some services succeed silently when `name` does not exist.
    fn delete_secret(&self, name: &str) -> Result<()>;
}
