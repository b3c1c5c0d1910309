#[tokio::main]
async fn main() {
    validation_check::start_server().await;
}
