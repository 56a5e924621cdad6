// Headless status widget: mount, wait for the health check, print the result.

use fantasyra_backend::client::{HttpHealthSource, StatusPage};
use fantasyra_backend::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    let source = HttpHealthSource::new(config.api_url.clone());
    let mut page = StatusPage::mount(source, config.api_url);

    println!("{}", page.render());
    page.settled().await;
    println!("{}", page.render());
}
