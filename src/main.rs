#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    contrato_server::run().await
}
