use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    hrungnir::cli::run().await
}
