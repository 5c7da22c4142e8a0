//! Administrative AWS actions for cost management: the report bucket, the cost
//! and usage report, and the IAM policy and role shared with a cost account.

pub mod aws_provider;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod policy;
pub mod provider;
pub mod scripts;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use aws_provider::AwsProvider;
pub use config::AwsConfig;
pub use error::{ConfigError, ProviderError, ServiceError, ServiceResult};
pub use model::{PolicyDescriptor, ReportDefinition, RoleDescriptor};
pub use provider::CloudProvider;
pub use service::AwsService;
