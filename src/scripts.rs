//! Shared plumbing and message texts of the command line entry points in `src/bin`.
//!
//! Every entry point reads its settings, runs one action against the facade and
//! prints one of two fixed messages; the outcome never changes the exit code.

use std::fmt;

use serde::Serialize;

use crate::config::env_or;
use crate::provider::CloudProvider;
use crate::service::AwsService;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BUCKET: &str = "costmgmtacct1234";
pub const DEFAULT_REPORT: &str = "creport";
pub const DEFAULT_POLICY: &str = "cost_mgmt";
pub const DEFAULT_ROLE: &str = "cost_mgmt";

pub const MISSING_SHARE_ACCOUNT: &str = "You must set the SHARE_ACCOUNT environment variable.";

/// Settings the entry points take from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub region: String,
    pub s3_bucket: String,
    pub cost_report: String,
    pub cost_policy: String,
    pub cost_role: String,
    /// account allowed to assume the cost role; has no default
    pub share_account: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            s3_bucket: DEFAULT_BUCKET.to_owned(),
            cost_report: DEFAULT_REPORT.to_owned(),
            cost_policy: DEFAULT_POLICY.to_owned(),
            cost_role: DEFAULT_ROLE.to_owned(),
            share_account: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            region: env_or("REGION", DEFAULT_REGION),
            s3_bucket: env_or("S3_BUCKET", DEFAULT_BUCKET),
            cost_report: env_or("COST_REPORT", DEFAULT_REPORT),
            cost_policy: env_or("COST_POLICY", DEFAULT_POLICY),
            cost_role: env_or("COST_ROLE", DEFAULT_ROLE),
            share_account: std::env::var("SHARE_ACCOUNT").ok(),
        }
    }
}

/// Log to stderr at INFO, without module names.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// One-line JSON rendering of a described resource, falling back to its `Debug` form.
fn to_json_line<T: Serialize + fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

pub async fn setup_s3_bucket<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings) -> String {
    let bucket = &settings.s3_bucket;
    match aws.create_bucket(bucket, Some(&settings.region)).await {
        Ok(()) => format!("S3 bucket {bucket} was created."),
        Err(_) => format!("Failed creating S3 bucket {bucket}."),
    }
}

pub async fn remove_s3_bucket<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings) -> String {
    let bucket = &settings.s3_bucket;
    match aws.delete_bucket(bucket, Some(&settings.region)).await {
        Ok(()) => format!("S3 bucket {bucket} was deleted."),
        Err(_) => format!("Failed deleting S3 bucket {bucket}."),
    }
}

pub async fn setup_cost_usage_report<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings) -> String {
    let report = &settings.cost_report;
    match aws
        .create_cost_usage_report(report, &settings.s3_bucket, &settings.region)
        .await
    {
        Ok(()) => format!("Cost usage report {report} was created."),
        Err(_) => format!("Failed creating cost usage report {report}."),
    }
}

pub async fn remove_cost_usage_report<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings) -> String {
    let report = &settings.cost_report;
    match aws
        .delete_cost_usage_report(report, &settings.s3_bucket, Some(&settings.region))
        .await
    {
        Ok(()) => format!("Cost usage report {report} was removed."),
        Err(_) => format!("Failed removing cost usage report {report}."),
    }
}

pub async fn list_cost_usage_reports<P: CloudProvider>(aws: &AwsService<P>) -> String {
    match aws.list_cost_usage_reports().await {
        Ok(reports) => {
            let mut lines = vec!["Cost usage reports:".to_owned()];
            lines.extend(reports.iter().map(to_json_line));
            lines.join("\n")
        }
        Err(_) => "Failed to list cost usage reports.".to_owned(),
    }
}

pub async fn setup_arn<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings, share_account: &str) -> String {
    match aws
        .create_cost_arn(&settings.cost_policy, &settings.s3_bucket, &settings.cost_role, share_account)
        .await
    {
        Ok(arn) => format!("Cost ARN {arn} was created."),
        Err(_) => "Failed creating cost ARN.".to_owned(),
    }
}

pub async fn get_policy_by_name<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings) -> String {
    let policy = &settings.cost_policy;
    match aws.get_iam_policy(policy).await {
        Ok(descriptor) => to_json_line(&descriptor),
        Err(_) => format!("Failed to retrieve policy {policy}."),
    }
}

pub async fn get_role_by_name<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings) -> String {
    let role = &settings.cost_role;
    match aws.get_iam_role(role).await {
        Ok(descriptor) => format!("Retrieved role {role} with ARN {}", descriptor.arn),
        Err(_) => format!("Failed to retrieve role {role}."),
    }
}

pub async fn remove_policy_by_name<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings) -> String {
    let policy = &settings.cost_policy;
    match aws.delete_iam_policy(policy).await {
        Ok(()) => format!("Successfully deleted policy {policy}"),
        Err(_) => format!("Failed to delete policy {policy}."),
    }
}

pub async fn remove_role_by_name<P: CloudProvider>(aws: &AwsService<P>, settings: &Settings) -> String {
    let role = &settings.cost_role;
    match aws.delete_iam_role(role).await {
        Ok(()) => format!("Successfully deleted role {role}"),
        Err(_) => format!("Failed to delete role {role}."),
    }
}
