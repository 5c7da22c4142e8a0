//! Test doubles: a recording provider and an error-event counter.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::error::ProviderError;
use crate::model::{PolicyDescriptor, ReportDefinition, ReportPage, RoleDescriptor};
use crate::policy;
use crate::provider::{CloudProvider, ProviderResult};

pub const ACCOUNT_ID: &str = "123456789012";

pub fn access_denied() -> ProviderError {
    ProviderError::Service {
        code: Some("AccessDenied".to_owned()),
        message: "Access Denied".to_owned(),
    }
}

pub fn not_found(code: &str) -> ProviderError {
    ProviderError::NotFound {
        code: code.to_owned(),
        message: "The specified resource does not exist".to_owned(),
    }
}

/// Records every call and fails the methods it was told to fail.
#[derive(Default)]
pub struct MockProvider {
    calls: Mutex<Vec<String>>,
    failures: HashMap<&'static str, ProviderError>,
    report_pages: Mutex<VecDeque<ReportPage>>,
    attached_policies: Vec<String>,
    policy_roles: Vec<String>,
    bucket_policies: Mutex<Vec<String>>,
    trust_documents: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn fail_on(mut self, method: &'static str, err: ProviderError) -> Self {
        self.failures.insert(method, err);
        self
    }

    pub fn with_report_pages(self, pages: Vec<ReportPage>) -> Self {
        *self.report_pages.lock().unwrap() = pages.into();
        self
    }

    pub fn with_attached_policies(mut self, arns: &[&str]) -> Self {
        self.attached_policies = arns.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_policy_roles(mut self, roles: &[&str]) -> Self {
        self.policy_roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bucket_policies(&self) -> Vec<String> {
        self.bucket_policies.lock().unwrap().clone()
    }

    pub fn trust_documents(&self) -> Vec<String> {
        self.trust_documents.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, args: &[&str]) -> ProviderResult<()> {
        let mut call = method.to_owned();
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.lock().unwrap().push(call);
        match self.failures.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn role(role_name: &str) -> RoleDescriptor {
        RoleDescriptor {
            role_name: role_name.to_owned(),
            role_id: "AROAEXAMPLE".to_owned(),
            arn: format!("arn:aws:iam::{ACCOUNT_ID}:role/{role_name}"),
            path: "/".to_owned(),
            assume_role_policy_document: None,
        }
    }

    fn policy(policy_name: &str) -> PolicyDescriptor {
        PolicyDescriptor {
            policy_name: policy_name.to_owned(),
            policy_id: Some("ANPAEXAMPLE".to_owned()),
            arn: policy::policy_arn(ACCOUNT_ID, policy_name),
            default_version_id: Some("v1".to_owned()),
            attachment_count: Some(0),
        }
    }
}

#[async_trait]
impl CloudProvider for MockProvider {
    async fn create_bucket(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()> {
        self.record("create_bucket", &[bucket_name, region.unwrap_or("default")])
    }

    async fn delete_bucket(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()> {
        self.record("delete_bucket", &[bucket_name, region.unwrap_or("default")])
    }

    async fn put_bucket_policy(&self, bucket_name: &str, region: Option<&str>, policy: &str) -> ProviderResult<()> {
        self.record("put_bucket_policy", &[bucket_name, region.unwrap_or("default")])?;
        self.bucket_policies.lock().unwrap().push(policy.to_owned());
        Ok(())
    }

    async fn delete_bucket_policy(&self, bucket_name: &str, region: Option<&str>) -> ProviderResult<()> {
        self.record("delete_bucket_policy", &[bucket_name, region.unwrap_or("default")])
    }

    async fn put_report_definition(&self, report: &ReportDefinition) -> ProviderResult<()> {
        self.record("put_report_definition", &[report.report_name.as_str()])
    }

    async fn describe_report_definitions(&self, next_token: Option<String>) -> ProviderResult<ReportPage> {
        self.record("describe_report_definitions", &[next_token.as_deref().unwrap_or("-")])?;
        Ok(self.report_pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn delete_report_definition(&self, report_name: &str) -> ProviderResult<()> {
        self.record("delete_report_definition", &[report_name])
    }

    async fn caller_account_id(&self) -> ProviderResult<String> {
        self.record("caller_account_id", &[])?;
        Ok(ACCOUNT_ID.to_owned())
    }

    async fn create_policy(&self, policy_name: &str, _document: &str) -> ProviderResult<PolicyDescriptor> {
        self.record("create_policy", &[policy_name])?;
        Ok(Self::policy(policy_name))
    }

    async fn get_policy(&self, policy_arn: &str) -> ProviderResult<PolicyDescriptor> {
        self.record("get_policy", &[policy_arn])?;
        let name = policy_arn.rsplit('/').next().unwrap_or(policy_arn);
        Ok(Self::policy(name))
    }

    async fn delete_policy(&self, policy_arn: &str) -> ProviderResult<()> {
        self.record("delete_policy", &[policy_arn])
    }

    async fn list_policy_roles(&self, policy_arn: &str) -> ProviderResult<Vec<String>> {
        self.record("list_policy_roles", &[policy_arn])?;
        Ok(self.policy_roles.clone())
    }

    async fn create_role(&self, role_name: &str, trust_document: &str) -> ProviderResult<RoleDescriptor> {
        self.record("create_role", &[role_name])?;
        self.trust_documents.lock().unwrap().push(trust_document.to_owned());
        Ok(Self::role(role_name))
    }

    async fn get_role(&self, role_name: &str) -> ProviderResult<RoleDescriptor> {
        self.record("get_role", &[role_name])?;
        Ok(Self::role(role_name))
    }

    async fn delete_role(&self, role_name: &str) -> ProviderResult<()> {
        self.record("delete_role", &[role_name])
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> ProviderResult<()> {
        self.record("attach_role_policy", &[role_name, policy_arn])
    }

    async fn list_attached_role_policies(&self, role_name: &str) -> ProviderResult<Vec<String>> {
        self.record("list_attached_role_policies", &[role_name])?;
        Ok(self.attached_policies.clone())
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> ProviderResult<()> {
        self.record("detach_role_policy", &[role_name, policy_arn])
    }
}

#[derive(Default)]
struct LevelCounts {
    errors: AtomicUsize,
    warnings: AtomicUsize,
}

struct LevelCounter {
    counts: Arc<LevelCounts>,
}

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        match *event.metadata().level() {
            Level::ERROR => self.counts.errors.fetch_add(1, Ordering::SeqCst),
            Level::WARN => self.counts.warnings.fetch_add(1, Ordering::SeqCst),
            _ => 0,
        };
    }
}

/// Run `action` and count the ERROR and WARN events it emits on this thread.
pub async fn capture_events<F: Future>(action: F) -> (F::Output, usize, usize) {
    let counts = Arc::new(LevelCounts::default());
    let subscriber = tracing_subscriber::registry().with(LevelCounter {
        counts: Arc::clone(&counts),
    });
    let guard = tracing::subscriber::set_default(subscriber);
    let output = action.await;
    drop(guard);
    (
        output,
        counts.errors.load(Ordering::SeqCst),
        counts.warnings.load(Ordering::SeqCst),
    )
}

/// Run `action` and count the ERROR events it emits on this thread.
pub async fn capture_errors<F: Future>(action: F) -> (F::Output, usize) {
    let (output, errors, _) = capture_events(action).await;
    (output, errors)
}
