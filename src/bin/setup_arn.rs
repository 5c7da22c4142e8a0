use std::process;

use cost_mgmt_setup::{scripts, AwsService, ConfigError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ConfigError> {
    scripts::init_logging();

    let settings = scripts::Settings::from_env();
    let Some(share_account) = settings.share_account.clone() else {
        println!("{}", scripts::MISSING_SHARE_ACCOUNT);
        process::exit(1);
    };
    let aws = AwsService::from_env().await?;

    println!("{}", scripts::setup_arn(&aws, &settings, &share_account).await);
    Ok(())
}
