use std::error::Error as StdError;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::{Region, SdkConfig};
use aws_sdk_costandusagereport::types::{
    AdditionalArtifact, AwsRegion, CompressionFormat, ReportDefinition as CurDefinition,
    ReportFormat, ReportVersioning, SchemaElement, TimeUnit,
};
use aws_sdk_iam::types::{EntityType, Policy, Role};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::debug;

use crate::client::{self, CUR_REGION, REGION};
use crate::config::AwsConfig;
use crate::error::ProviderError;
use crate::model::{PolicyDescriptor, ReportDefinition, ReportPage, RoleDescriptor};
use crate::provider::{CloudProvider, ProviderResult};

/// Error codes that mean the addressed resource does not exist.
const NOT_FOUND_CODES: &[&str] = &["NoSuchBucket", "NoSuchBucketPolicy", "NoSuchEntity"];

/// Map an SDK failure onto a `ProviderError`, keeping the service error code when there is one.
pub fn classify<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: Debug,
{
    let code = err.code().map(str::to_owned);
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code.as_str()) => ProviderError::NotFound {
            message: err.message().unwrap_or(code.as_str()).to_owned(),
            code,
        },
        code => ProviderError::Service {
            code,
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

/// `CloudProvider` backed by the AWS SDK.
///
/// Only the shared configuration is kept; a new client is created for each call.
pub struct AwsProvider {
    sdk_config: SdkConfig,
}

impl AwsProvider {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    pub async fn from_config(config: &AwsConfig) -> Self {
        Self::new(client::load_sdk_config(config).await)
    }

    /// S3 client for the endpoint of `region`, `REGION` when none is given.
    ///
    /// S3 answers requests sent to another region than the bucket's with a redirect
    /// the SDK does not follow, so the client region is never left to the shared config.
    fn s3_client(&self, region: Option<&str>) -> aws_sdk_s3::Client {
        let region = Region::new(region.unwrap_or(REGION).to_owned());
        let conf = aws_sdk_s3::config::Builder::from(&self.sdk_config)
            .region(region)
            .build();
        aws_sdk_s3::Client::from_conf(conf)
    }

    fn cur_client(&self) -> aws_sdk_costandusagereport::Client {
        let conf = aws_sdk_costandusagereport::config::Builder::from(&self.sdk_config)
            .region(Region::new(CUR_REGION))
            .build();
        aws_sdk_costandusagereport::Client::from_conf(conf)
    }

    fn iam_client(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(&self.sdk_config)
    }

    fn sts_client(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(&self.sdk_config)
    }
}

fn to_cur_definition(report: &ReportDefinition) -> ProviderResult<CurDefinition> {
    CurDefinition::builder()
        .report_name(&report.report_name)
        .time_unit(TimeUnit::from(report.time_unit.as_str()))
        .format(ReportFormat::from(report.format.as_str()))
        .compression(CompressionFormat::from(report.compression.as_str()))
        .set_additional_schema_elements(Some(
            report
                .additional_schema_elements
                .iter()
                .map(|e| SchemaElement::from(e.as_str()))
                .collect(),
        ))
        .s3_bucket(&report.s3_bucket)
        .s3_prefix(&report.s3_prefix)
        .s3_region(AwsRegion::from(report.s3_region.as_str()))
        .set_additional_artifacts(Some(
            report
                .additional_artifacts
                .iter()
                .map(|a| AdditionalArtifact::from(a.as_str()))
                .collect(),
        ))
        .refresh_closed_reports(report.refresh_closed_reports)
        .report_versioning(ReportVersioning::from(report.report_versioning.as_str()))
        .build()
        .map_err(|err| ProviderError::Service {
            code: None,
            message: err.to_string(),
        })
}

fn from_cur_definition(def: &CurDefinition) -> ReportDefinition {
    ReportDefinition {
        report_name: def.report_name().to_owned(),
        time_unit: def.time_unit().as_str().to_owned(),
        format: def.format().as_str().to_owned(),
        compression: def.compression().as_str().to_owned(),
        additional_schema_elements: def
            .additional_schema_elements()
            .iter()
            .map(|e| e.as_str().to_owned())
            .collect(),
        s3_bucket: def.s3_bucket().to_owned(),
        s3_prefix: def.s3_prefix().to_owned(),
        s3_region: def.s3_region().as_str().to_owned(),
        additional_artifacts: def
            .additional_artifacts()
            .iter()
            .map(|a| a.as_str().to_owned())
            .collect(),
        refresh_closed_reports: def.refresh_closed_reports().unwrap_or(false),
        report_versioning: def
            .report_versioning()
            .map(|v| v.as_str().to_owned())
            .unwrap_or_default(),
    }
}

fn policy_descriptor(policy: &Policy) -> ProviderResult<PolicyDescriptor> {
    Ok(PolicyDescriptor {
        policy_name: policy
            .policy_name()
            .ok_or(ProviderError::Malformed("PolicyName"))?
            .to_owned(),
        policy_id: policy.policy_id().map(str::to_owned),
        arn: policy.arn().ok_or(ProviderError::Malformed("Arn"))?.to_owned(),
        default_version_id: policy.default_version_id().map(str::to_owned),
        attachment_count: policy.attachment_count(),
    })
}

fn role_descriptor(role: &Role) -> RoleDescriptor {
    RoleDescriptor {
        role_name: role.role_name().to_owned(),
        role_id: role.role_id().to_owned(),
        arn: role.arn().to_owned(),
        path: role.path().to_owned(),
        assume_role_policy_document: role.assume_role_policy_document().map(str::to_owned),
    }
}

#[async_trait]
impl CloudProvider for AwsProvider {
    async fn create_bucket(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()> {
        let client = self.s3_client(region);
        let mut request = client.create_bucket().bucket(bucket_name);
        // us-east-1 is the default location and must not be passed as a constraint
        if let Some(region) = region.filter(|r| *r != REGION) {
            let cfg = CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build();
            request = request.create_bucket_configuration(cfg);
        }
        request.send().await.map_err(classify)?;
        debug!("Created bucket {bucket_name} (region {region:?})");
        Ok(())
    }

    async fn delete_bucket(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()> {
        self.s3_client(region)
            .delete_bucket()
            .bucket(bucket_name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket_name: &str, region: Option<&str>, policy: &str) -> ProviderResult<()> {
        self.s3_client(region)
            .put_bucket_policy()
            .bucket(bucket_name)
            .policy(policy)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete_bucket_policy(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()> {
        self.s3_client(region)
            .delete_bucket_policy()
            .bucket(bucket_name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn put_report_definition(&self, report: &ReportDefinition) -> ProviderResult<()> {
        let definition = to_cur_definition(report)?;
        self.cur_client()
            .put_report_definition()
            .report_definition(definition)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn describe_report_definitions(&self, next_token: Option<String>) -> ProviderResult<ReportPage> {
        let output = self
            .cur_client()
            .describe_report_definitions()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(classify)?;
        Ok(ReportPage {
            reports: output.report_definitions().iter().map(from_cur_definition).collect(),
            next_token: output.next_token().map(str::to_owned),
        })
    }

    async fn delete_report_definition(&self, report_name: &str) -> ProviderResult<()> {
        self.cur_client()
            .delete_report_definition()
            .report_name(report_name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn caller_account_id(&self) -> ProviderResult<String> {
        let output = self
            .sts_client()
            .get_caller_identity()
            .send()
            .await
            .map_err(classify)?;
        output
            .account()
            .map(str::to_owned)
            .ok_or(ProviderError::Malformed("Account"))
    }

    async fn create_policy(&self, policy_name: &str, document: &str) -> ProviderResult<PolicyDescriptor> {
        let output = self
            .iam_client()
            .create_policy()
            .policy_name(policy_name)
            .policy_document(document)
            .send()
            .await
            .map_err(classify)?;
        policy_descriptor(output.policy().ok_or(ProviderError::Malformed("Policy"))?)
    }

    async fn get_policy(&self, policy_arn: &str) -> ProviderResult<PolicyDescriptor> {
        let output = self
            .iam_client()
            .get_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(classify)?;
        policy_descriptor(output.policy().ok_or(ProviderError::Malformed("Policy"))?)
    }

    async fn delete_policy(&self, policy_arn: &str) -> ProviderResult<()> {
        self.iam_client()
            .delete_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_policy_roles(&self, policy_arn: &str) -> ProviderResult<Vec<String>> {
        let client = self.iam_client();
        let mut roles = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = client
                .list_entities_for_policy()
                .policy_arn(policy_arn)
                .entity_filter(EntityType::Role)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(classify)?;
            roles.extend(
                output
                    .policy_roles()
                    .iter()
                    .filter_map(|r| r.role_name().map(str::to_owned)),
            );
            match output.marker() {
                Some(next) => marker = Some(next.to_owned()),
                None => break,
            }
        }
        Ok(roles)
    }

    async fn create_role(&self, role_name: &str, trust_document: &str) -> ProviderResult<RoleDescriptor> {
        let output = self
            .iam_client()
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(trust_document)
            .send()
            .await
            .map_err(classify)?;
        output
            .role()
            .map(role_descriptor)
            .ok_or(ProviderError::Malformed("Role"))
    }

    async fn get_role(&self, role_name: &str) -> ProviderResult<RoleDescriptor> {
        let output = self
            .iam_client()
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(classify)?;
        output
            .role()
            .map(role_descriptor)
            .ok_or(ProviderError::Malformed("Role"))
    }

    async fn delete_role(&self, role_name: &str) -> ProviderResult<()> {
        self.iam_client()
            .delete_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> ProviderResult<()> {
        self.iam_client()
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_attached_role_policies(&self, role_name: &str) -> ProviderResult<Vec<String>> {
        let client = self.iam_client();
        let mut arns = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = client
                .list_attached_role_policies()
                .role_name(role_name)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(classify)?;
            arns.extend(
                output
                    .attached_policies()
                    .iter()
                    .filter_map(|p| p.policy_arn().map(str::to_owned)),
            );
            match output.marker() {
                Some(next) => marker = Some(next.to_owned()),
                None => break,
            }
        }
        Ok(arns)
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> ProviderResult<()> {
        self.iam_client()
            .detach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_definition_converts_to_sdk_and_back() {
        let report = ReportDefinition::hourly("creport", "costmgmtacct1234", "us-west-2");
        let sdk = to_cur_definition(&report).unwrap();
        assert_eq!(sdk.report_name(), "creport");
        assert_eq!(sdk.time_unit().as_str(), "HOURLY");
        assert_eq!(sdk.format().as_str(), "textORcsv");
        assert_eq!(from_cur_definition(&sdk), report);
    }

    #[test]
    fn s3_client_region_ignores_shared_config() {
        let provider = AwsProvider::new(
            SdkConfig::builder()
                .region(Region::new("eu-west-1"))
                .behavior_version(aws_config::BehaviorVersion::latest())
                .build(),
        );
        let default = provider.s3_client(None);
        assert_eq!(default.config().region(), Some(&Region::new(REGION)));
        let regional = provider.s3_client(Some("us-west-2"));
        assert_eq!(regional.config().region(), Some(&Region::new("us-west-2")));
        assert_eq!(provider.cur_client().config().region(), Some(&Region::new(CUR_REGION)));
    }

    #[test]
    fn policy_without_arn_is_malformed() {
        let policy = Policy::builder().policy_name("cost_mgmt").build();
        assert_eq!(policy_descriptor(&policy), Err(ProviderError::Malformed("Arn")));
    }

    #[test]
    fn policy_descriptor_copies_fields() {
        let policy = Policy::builder()
            .policy_name("cost_mgmt")
            .arn("arn:aws:iam::123456789012:policy/cost_mgmt")
            .default_version_id("v1")
            .attachment_count(0)
            .build();
        let descriptor = policy_descriptor(&policy).unwrap();
        assert_eq!(descriptor.arn, "arn:aws:iam::123456789012:policy/cost_mgmt");
        assert_eq!(descriptor.default_version_id.as_deref(), Some("v1"));
        assert_eq!(descriptor.attachment_count, Some(0));
    }
}
