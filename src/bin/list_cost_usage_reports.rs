use cost_mgmt_setup::{scripts, AwsService, ConfigError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ConfigError> {
    scripts::init_logging();

    let aws = AwsService::from_env().await?;

    println!("{}", scripts::list_cost_usage_reports(&aws).await);
    Ok(())
}
