use clap::Parser;
use std::path::PathBuf;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "passkeep",
    about = "Store, list, retrieve and delete user ID / password pairs in AWS Secrets Manager.",
    version
)]
pub struct Cli {
    /// Config file to read instead of .passkeep/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Named AWS profile from ~/.aws/config (overrides AWS_PROFILE).
    #[arg(long)]
    pub profile: Option<String>,

    /// AWS region (overrides AWS_REGION, the profile and the config file).
    #[arg(long)]
    pub region: Option<String>,

    /// Secrets Manager endpoint, e.g. http://localhost:4566 for LocalStack.
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// File that retrieved secrets are written to.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            profile: self.profile.clone(),
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            output_file: self.output.clone(),
        }
    }
}
