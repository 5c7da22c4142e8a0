use cost_mgmt_setup::{scripts, AwsService, ConfigError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ConfigError> {
    scripts::init_logging();

    let settings = scripts::Settings::from_env();
    let aws = AwsService::from_env().await?;

    println!("{}", scripts::remove_cost_usage_report(&aws, &settings).await);
    Ok(())
}
