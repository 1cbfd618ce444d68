use moodtunes_lib::config::Config;

#[tokio::main]
async fn main() {
    // A missing .env is fine; the real environment still applies.
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = moodtunes_lib::run(config).await {
        log::error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}
