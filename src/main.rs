#[tokio::main]
async fn main() -> pingbot::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("pingbot=info,serenity=warn"),
    )
    .init();
    log::info!("Starting pingbot");

    match pingbot::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {}", e);
            Err(e)
        }
    }
}
