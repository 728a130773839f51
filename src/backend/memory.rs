use std::cell::RefCell;

use crate::backend::{Result, SecretBackend};
use crate::error::PasskeepError;

/// In-process stand-in for Secrets Manager.
#[derive(Default)]
pub struct MemoryBackend {
    secrets: RefCell<Vec<(String, String)>>,
    failure: RefCell<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call after this returns a service error with `code`.
    pub fn fail_with(&self, code: &str) {
        *self.failure.borrow_mut() = Some(code.to_string());
    }

    pub fn raw(&self, name: &str) -> Option<String> {
        self.secrets
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn insert_raw(&self, name: &str, secret_string: &str) {
        self.secrets
            .borrow_mut()
            .push((name.to_string(), secret_string.to_string()));
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.borrow().as_deref() {
            Some(code) => Err(PasskeepError::service(code, "injected failure")),
            None => Ok(()),
        }
    }
}

impl SecretBackend for MemoryBackend {
    fn create_secret(&self, name: &str, secret_string: &str) -> Result<()> {
        self.check_failure()?;
        if self.raw(name).is_some() {
            return Err(PasskeepError::AlreadyExists(name.to_string()));
        }
        self.insert_raw(name, secret_string);
        Ok(())
    }

    fn list_secret_names(&self) -> Result<Vec<String>> {
        self.check_failure()?;
        Ok(self.secrets.borrow().iter().map(|(n, _)| n.clone()).collect())
    }

    fn get_secret_string(&self, name: &str) -> Result<String> {
        self.check_failure()?;
        self.raw(name)
            .ok_or_else(|| PasskeepError::NotFound(name.to_string()))
    }

    fn secret_exists(&self, name: &str) -> Result<bool> {
        self.check_failure()?;
        Ok(self.raw(name).is_some())
    }

    fn delete_secret(&self, name: &str) -> Result<()> {
        self.check_failure()?;
        self.secrets.borrow_mut().retain(|(n, _)| n != name);
        Ok(())
    }
}
