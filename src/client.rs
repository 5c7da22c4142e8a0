use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;

use crate::config::AwsConfig;

/// Region used for clients when none is configured.
pub const REGION: &str = "us-east-1";

/// Cost and usage report definitions are only served from this region.
pub const CUR_REGION: &str = "us-east-1";

const PROVIDER_NAME: &str = "cost_mgmt_setup";

/// the static credentials described by `config`
pub fn credentials(config: &AwsConfig) -> Credentials {
    Credentials::new(
        config.access_key_id(),
        config.secret_access_key(),
        config.session_token().map(str::to_owned),
        None,
        PROVIDER_NAME,
    )
}

/// Load the shared SDK configuration for `config`.
///
/// Region and credentials are both fixed up front, so loading never has to
/// consult instance metadata or any other network source.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let region = Region::new(config.region().unwrap_or(REGION).to_owned());
    let region_provider = RegionProviderChain::first_try(region);

    aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .credentials_provider(credentials(config))
        .load()
        .await
}
