use std::io;

#[tokio::main]
async fn main() -> io::Result<()> {
    score_server::init_runtime();
    score_server::run_with_config().await
}
