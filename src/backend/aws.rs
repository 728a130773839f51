//! Blocking wrapper around the AWS Secrets Manager SDK client.

use std::future::Future;

use aws_config::profile::profile_file::ProfileFiles;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::Client;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::backend::{Result, SecretBackend};
use crate::config::Settings;
use crate::error::PasskeepError;

const LIST_PAGE_SIZE: i32 = 100;

const RESOURCE_EXISTS: &str = "ResourceExistsException";
const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// Secrets Manager client. Every call runs to completion on a private
/// current-thread runtime, so requests stay strictly sequential.
pub struct SecretsManagerClient {
    runtime: Runtime,
    client: Client,
}

impl SecretsManagerClient {
    /// Resolves region and credentials through the AWS provider chain and
    /// builds a client. Fails when either cannot be found.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let runtime = runtime()?;
        let sdk_config = runtime.block_on(load_sdk_config(settings, None))?;
        debug!(
            region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("none"),
            "AWS configuration loaded"
        );
        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
        })
    }

    #[cfg(test)]
    fn from_conf(config: aws_sdk_secretsmanager::Config) -> Result<Self> {
        Ok(Self {
            runtime: runtime()?,
            client: Client::from_conf(config),
        })
    }

    fn send<T, E, R>(
        &self,
        operation: &'static str,
        request: impl Future<Output = std::result::Result<T, SdkError<E, R>>>,
    ) -> Result<T>
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        debug!(operation, "sending Secrets Manager request");
        self.runtime.block_on(request).map_err(|err| {
            let err = service_error(err);
            debug!(operation, error = %err, "Secrets Manager request failed");
            err
        })
    }
}

impl SecretBackend for SecretsManagerClient {
    fn create_secret(&self, name: &str, secret_string: &str) -> Result<()> {
        let request = self
            .client
            .create_secret()
            .name(name)
            .secret_string(secret_string)
            .send();
        self.send("CreateSecret", request)
            .map(|_| ())
            .map_err(|e| classify(e, name))
    }

    fn list_secret_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let request = self
                .client
                .list_secrets()
                .max_results(LIST_PAGE_SIZE)
                .set_next_token(next_token.take())
                .send();
            let page = self.send("ListSecrets", request)?;
            names.extend(
                page.secret_list()
                    .iter()
                    .filter_map(|entry| entry.name())
                    .map(str::to_string),
            );

            match page.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(names)
    }

    fn get_secret_string(&self, name: &str) -> Result<String> {
        let request = self.client.get_secret_value().secret_id(name).send();
        let response = self
            .send("GetSecretValue", request)
            .map_err(|e| classify(e, name))?;
        response.secret_string().map(str::to_string).ok_or_else(|| {
            PasskeepError::Serialization(format!("Secret '{}' has no string value.", name))
        })
    }

    fn secret_exists(&self, name: &str) -> Result<bool> {
        let request = self.client.describe_secret().secret_id(name).send();
        match self.send("DescribeSecret", request) {
            Ok(_) => Ok(true),
            Err(e) => match classify(e, name) {
                PasskeepError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    fn delete_secret(&self, name: &str) -> Result<()> {
        let request = self
            .client
            .delete_secret()
            .secret_id(name)
            .force_delete_without_recovery(true)
            .send();
        self.send("DeleteSecret", request)
            .map(|_| ())
            .map_err(|e| classify(e, name))
    }
}

fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Loads the shared AWS configuration. `profile_files` replaces the default
/// `~/.aws/config` and `~/.aws/credentials` locations.
async fn load_sdk_config(
    settings: &Settings,
    profile_files: Option<ProfileFiles>,
) -> Result<SdkConfig> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(files) = profile_files {
        loader = loader.profile_files(files);
    }
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(url) = &settings.endpoint_url {
        loader = loader.endpoint_url(url);
    }
    let mut sdk_config = loader.load().await;

    if sdk_config.region().is_none() {
        let fallback = settings.fallback_region.clone().ok_or_else(|| {
            PasskeepError::Config(
                "No AWS region configured. Set AWS_REGION, use a profile with a region, or pass --region."
                    .into(),
            )
        })?;
        sdk_config = sdk_config.to_builder().region(Region::new(fallback)).build();
    }

    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| PasskeepError::Config("No AWS credentials provider configured.".into()))?;
    provider.provide_credentials().await.map_err(|e| {
        PasskeepError::Config(format!(
            "No usable AWS credentials found: {}",
            DisplayErrorContext(&e)
        ))
    })?;

    Ok(sdk_config)
}

/// Keeps the service's error code; anything without one never reached the
/// service and is reported as a transport failure.
fn service_error<E, R>(err: SdkError<E, R>) -> PasskeepError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some(code) => PasskeepError::service(code, err.message().unwrap_or_default()),
        None => PasskeepError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

/// Turns a name-specific service error into `AlreadyExists` / `NotFound`.
fn classify(err: PasskeepError, name: &str) -> PasskeepError {
    match err {
        PasskeepError::Service { ref code, .. } if code == RESOURCE_EXISTS => {
            PasskeepError::AlreadyExists(name.to_string())
        }
        PasskeepError::Service { ref code, .. } if code == RESOURCE_NOT_FOUND => {
            PasskeepError::NotFound(name.to_string())
        }
        other => other,
    }
}
