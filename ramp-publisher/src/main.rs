use anyhow::Context;
use log::info;

use ramp_publisher::config::{app, ApplicationConfig};
use ramp_publisher::RampPublisher;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let matches = app().get_matches();
    let config = ApplicationConfig::new(&matches).context("failed to load the configuration")?;

    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    env_logger::Builder::from_env(env).init();

    let ramp = config.ramp_config()?;

    let mut publisher: RampPublisher =
        RampPublisher::new(config.client_name.as_str(), config.socket_options());
    info!("publishing as \"{}\"", publisher.client_name());
    publisher
        .connect(&config.endpoint)
        .with_context(|| format!("cannot reach {}", config.endpoint))?;

    let mut stdout = std::io::stdout();
    let summary = publisher
        .run(&ramp, &mut stdout)
        .await
        .context("ramp aborted")?;
    info!("{} messages sent", summary.total_messages);

    publisher.close().context("failed to close the socket")?;
    Ok(())
}
