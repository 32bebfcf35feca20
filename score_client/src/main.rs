use std::io;

#[tokio::main]
async fn main() -> io::Result<()> {
    score_client::init_runtime();
    score_client::run().await
}
