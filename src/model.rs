use serde::Serialize;

pub const TIME_UNIT_HOURLY: &str = "HOURLY";
pub const FORMAT_TEXT_OR_CSV: &str = "textORcsv";
pub const COMPRESSION_GZIP: &str = "GZIP";
pub const SCHEMA_RESOURCES: &str = "RESOURCES";
pub const ARTIFACT_REDSHIFT: &str = "REDSHIFT";
pub const ARTIFACT_QUICKSIGHT: &str = "QUICKSIGHT";
pub const VERSIONING_CREATE_NEW: &str = "CREATE_NEW_REPORT";

/// A cost and usage report definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportDefinition {
    pub report_name: String,
    pub time_unit: String,
    pub format: String,
    pub compression: String,
    pub additional_schema_elements: Vec<String>,
    #[serde(rename = "S3Bucket")]
    pub s3_bucket: String,
    #[serde(rename = "S3Prefix")]
    pub s3_prefix: String,
    #[serde(rename = "S3Region")]
    pub s3_region: String,
    pub additional_artifacts: Vec<String>,
    pub refresh_closed_reports: bool,
    pub report_versioning: String,
}

impl ReportDefinition {
    /// Hourly, gzipped csv report with resource ids, delivered to the root of `bucket`.
    pub fn hourly(report_name: &str, bucket: &str, region: &str) -> Self {
        Self {
            report_name: report_name.to_owned(),
            time_unit: TIME_UNIT_HOURLY.to_owned(),
            format: FORMAT_TEXT_OR_CSV.to_owned(),
            compression: COMPRESSION_GZIP.to_owned(),
            additional_schema_elements: vec![SCHEMA_RESOURCES.to_owned()],
            s3_bucket: bucket.to_owned(),
            s3_prefix: String::new(),
            s3_region: region.to_owned(),
            additional_artifacts: vec![ARTIFACT_REDSHIFT.to_owned(), ARTIFACT_QUICKSIGHT.to_owned()],
            refresh_closed_reports: true,
            report_versioning: VERSIONING_CREATE_NEW.to_owned(),
        }
    }
}

/// One page of report definitions plus the token of the next page, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportPage {
    pub reports: Vec<ReportDefinition>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDescriptor {
    pub policy_name: String,
    pub policy_id: Option<String>,
    pub arn: String,
    pub default_version_id: Option<String>,
    pub attachment_count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDescriptor {
    pub role_name: String,
    pub role_id: String,
    pub arn: String,
    pub path: String,
    pub assume_role_policy_document: Option<String>,
}
