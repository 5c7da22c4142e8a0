use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::{PolicyDescriptor, ReportDefinition, ReportPage, RoleDescriptor};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// The individual cloud calls the facade is composed of.
///
/// Every method performs exactly one provider request (the listing calls
/// may follow pagination markers).
#[async_trait]
pub trait CloudProvider: Send + Sync {
    // Bucket calls are sent to the endpoint of `region`; `None` means the default region.

    async fn create_bucket(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()>;
    async fn delete_bucket(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()>;
    async fn put_bucket_policy(&self, bucket_name: &str, region: Option<&str>, policy: &str) -> ProviderResult<()>;
    async fn delete_bucket_policy(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()>;

    async fn put_report_definition(&self, report: &ReportDefinition) -> ProviderResult<()>;
    /// fetch the page of report definitions starting at `next_token`
    async fn describe_report_definitions(&self, next_token: Option<String>) -> ProviderResult<ReportPage>;
    async fn delete_report_definition(&self, report_name: &str) -> ProviderResult<()>;

    /// account id of the credentials in use
    async fn caller_account_id(&self) -> ProviderResult<String>;

    async fn create_policy(&self, policy_name: &str, document: &str) -> ProviderResult<PolicyDescriptor>;
    async fn get_policy(&self, policy_arn: &str) -> ProviderResult<PolicyDescriptor>;
    async fn delete_policy(&self, policy_arn: &str) -> ProviderResult<()>;
    /// names of the roles the policy is attached to
    async fn list_policy_roles(&self, policy_arn: &str) -> ProviderResult<Vec<String>>;

    async fn create_role(&self, role_name: &str, trust_document: &str) -> ProviderResult<RoleDescriptor>;
    async fn get_role(&self, role_name: &str) -> ProviderResult<RoleDescriptor>;
    async fn delete_role(&self, role_name: &str) -> ProviderResult<()>;
    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> ProviderResult<()>;
    async fn list_attached_role_policies(&self, role_name: &str) -> ProviderResult<Vec<String>>;
    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> ProviderResult<()>;
}
