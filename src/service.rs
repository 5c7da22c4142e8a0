use tracing::{error, info, warn};

use crate::aws_provider::AwsProvider;
use crate::config::AwsConfig;
use crate::error::{ConfigError, ProviderError, ServiceError, ServiceResult};
use crate::model::{PolicyDescriptor, ReportDefinition, RoleDescriptor};
use crate::policy;
use crate::provider::CloudProvider;

const CREATE_BUCKET: &str = "create bucket";
const DELETE_BUCKET: &str = "delete bucket";
const CREATE_REPORT: &str = "create cost usage report";
const LIST_REPORTS: &str = "list cost usage reports";
const DELETE_REPORT: &str = "delete cost usage report";
const CREATE_COST_ARN: &str = "create cost ARN";
const GET_POLICY: &str = "get IAM policy";
const GET_ROLE: &str = "get IAM role";
const DELETE_POLICY: &str = "delete IAM policy";
const DELETE_ROLE: &str = "delete IAM role";

/// Log a failed provider call and turn it into the facade's error type.
fn provider_failure(operation: &'static str, resource: &str, source: ProviderError) -> ServiceError {
    let err = if source.is_not_found() {
        ServiceError::NotFound {
            operation,
            resource: resource.to_owned(),
        }
    } else {
        ServiceError::Provider { operation, source }
    };
    error!("{err}");
    err
}

fn precondition_failure(operation: &'static str, source: ProviderError) -> ServiceError {
    let err = ServiceError::Precondition { operation, source };
    error!("{err}");
    err
}

/// Facade over the administrative AWS actions.
///
/// Every operation either succeeds or logs exactly one error and returns it.
pub struct AwsService<P = AwsProvider> {
    provider: P,
}

impl AwsService<AwsProvider> {
    /// Connect with already validated settings. No request is sent until an operation is called.
    pub async fn new(config: AwsConfig) -> Self {
        Self::with_provider(AwsProvider::from_config(&config).await)
    }

    /// Connect with the credentials found in the environment.
    pub async fn from_env() -> Result<Self, ConfigError> {
        let config = AwsConfig::from_env()?;
        Ok(Self::new(config).await)
    }
}

impl<P: CloudProvider> AwsService<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Create a bucket, in `region` when given and in the default region otherwise.
    pub async fn create_bucket(&self, bucket_name: &str, region: Option<&str>) -> ServiceResult<()> {
        self.provider
            .create_bucket(bucket_name, region)
            .await
            .map_err(|e| provider_failure(CREATE_BUCKET, bucket_name, e))?;
        info!("Created bucket {bucket_name}");
        Ok(())
    }

    pub async fn delete_bucket(&self, bucket_name: &str, region: Option<&str>) -> ServiceResult<()> {
        self.provider
            .delete_bucket(bucket_name, region)
            .await
            .map_err(|e| provider_failure(DELETE_BUCKET, bucket_name, e))?;
        info!("Deleted bucket {bucket_name}");
        Ok(())
    }

    /// Open the bucket to the billing account, then register an hourly report that delivers into it.
    ///
    /// The report is only registered once the bucket policy is in place. `region` is the
    /// bucket's region, both for the policy request and as the report destination.
    pub async fn create_cost_usage_report(
        &self,
        cost_report: &str,
        bucket_name: &str,
        region: &str,
    ) -> ServiceResult<()> {
        let bucket_policy = policy::cur_bucket_policy(bucket_name).to_string();
        self.provider
            .put_bucket_policy(bucket_name, Some(region), &bucket_policy)
            .await
            .map_err(|e| provider_failure(CREATE_REPORT, bucket_name, e))?;

        let report = ReportDefinition::hourly(cost_report, bucket_name, region);
        self.provider
            .put_report_definition(&report)
            .await
            .map_err(|e| provider_failure(CREATE_REPORT, cost_report, e))?;
        info!("Created cost usage report {cost_report} in bucket {bucket_name}");
        Ok(())
    }

    /// All report definitions, every page drained in the order the provider returns them.
    pub async fn list_cost_usage_reports(&self) -> ServiceResult<Vec<ReportDefinition>> {
        let mut reports = Vec::new();
        let mut next_token = None;
        loop {
            let page = self
                .provider
                .describe_report_definitions(next_token.take())
                .await
                .map_err(|e| provider_failure(LIST_REPORTS, "report definitions", e))?;
            reports.extend(page.reports);
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(reports)
    }

    /// Remove the bucket policy, then the report definition.
    pub async fn delete_cost_usage_report(
        &self,
        cost_report: &str,
        bucket_name: &str,
        region: Option<&str>,
    ) -> ServiceResult<()> {
        self.provider
            .delete_bucket_policy(bucket_name, region)
            .await
            .map_err(|e| provider_failure(DELETE_REPORT, bucket_name, e))?;
        self.provider
            .delete_report_definition(cost_report)
            .await
            .map_err(|e| provider_failure(DELETE_REPORT, cost_report, e))?;
        info!("Deleted cost usage report {cost_report}");
        Ok(())
    }

    /// Create the cost policy and a role `share_account` may assume, attach the one to the other
    /// and return the ARN of the role.
    pub async fn create_cost_arn(
        &self,
        policy_name: &str,
        bucket_name: &str,
        role_name: &str,
        share_account: &str,
    ) -> ServiceResult<String> {
        let document = policy::cost_mgmt_policy(bucket_name).to_string();
        let created_policy = self
            .provider
            .create_policy(policy_name, &document)
            .await
            .map_err(|e| provider_failure(CREATE_COST_ARN, policy_name, e))?;

        let trust = policy::trust_policy(share_account).to_string();
        let role = self
            .provider
            .create_role(role_name, &trust)
            .await
            .map_err(|e| {
                warn!("Policy {} was created and is left in place", created_policy.arn);
                provider_failure(CREATE_COST_ARN, role_name, e)
            })?;

        self.provider
            .attach_role_policy(role_name, &created_policy.arn)
            .await
            .map_err(|e| {
                warn!(
                    "Policy {} and role {} were created and are left in place",
                    created_policy.arn, role.arn
                );
                provider_failure(CREATE_COST_ARN, role_name, e)
            })?;
        info!("Role {role_name} ({}) can now be assumed by account {share_account}", role.arn);
        Ok(role.arn)
    }

    async fn policy_arn(&self, operation: &'static str, policy_name: &str) -> ServiceResult<String> {
        let account_id = self
            .provider
            .caller_account_id()
            .await
            .map_err(|e| precondition_failure(operation, e))?;
        Ok(policy::policy_arn(&account_id, policy_name))
    }

    pub async fn get_iam_policy(&self, policy_name: &str) -> ServiceResult<PolicyDescriptor> {
        let arn = self.policy_arn(GET_POLICY, policy_name).await?;
        self.provider
            .get_policy(&arn)
            .await
            .map_err(|e| provider_failure(GET_POLICY, policy_name, e))
    }

    pub async fn get_iam_role(&self, role_name: &str) -> ServiceResult<RoleDescriptor> {
        self.provider
            .get_role(role_name)
            .await
            .map_err(|e| provider_failure(GET_ROLE, role_name, e))
    }

    /// Detach the policy from every role using it and delete it.
    pub async fn delete_iam_policy(&self, policy_name: &str) -> ServiceResult<()> {
        let arn = self.policy_arn(DELETE_POLICY, policy_name).await?;
        let roles = self
            .provider
            .list_policy_roles(&arn)
            .await
            .map_err(|e| provider_failure(DELETE_POLICY, policy_name, e))?;
        for role_name in &roles {
            self.provider
                .detach_role_policy(role_name, &arn)
                .await
                .map_err(|e| provider_failure(DELETE_POLICY, policy_name, e))?;
        }
        self.provider
            .delete_policy(&arn)
            .await
            .map_err(|e| provider_failure(DELETE_POLICY, policy_name, e))?;
        info!("Deleted policy {arn}");
        Ok(())
    }

    /// Detach every managed policy from the role and delete it.
    pub async fn delete_iam_role(&self, role_name: &str) -> ServiceResult<()> {
        let attached = self
            .provider
            .list_attached_role_policies(role_name)
            .await
            .map_err(|e| provider_failure(DELETE_ROLE, role_name, e))?;
        for policy_arn in &attached {
            self.provider
                .detach_role_policy(role_name, policy_arn)
                .await
                .map_err(|e| provider_failure(DELETE_ROLE, role_name, e))?;
        }
        self.provider
            .delete_role(role_name)
            .await
            .map_err(|e| provider_failure(DELETE_ROLE, role_name, e))?;
        info!("Deleted role {role_name}");
        Ok(())
    }
}
