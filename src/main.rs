use email_capture::config::get_configuration;
use email_capture::startup::Application;
use email_capture::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(
        String::from("email_capture"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config.clone()).await?;

    tracing::info!(
        store = %config.get_store_path().display(),
        "Email capture server running on port {}",
        application.get_port()
    );

    application.run_until_stopped().await
}
