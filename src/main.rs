use fantasyra_backend::config::Config;
use fantasyra_backend::server::Server;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();

    let handle = match Server::new(config.server_config()).start().await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to start server: {e}");
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    if let Err(e) = handle.run_until(shutdown).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
