#[tokio::main]
async fn main() -> anyhow::Result<()> {
    word_practice_backend::run().await
}
