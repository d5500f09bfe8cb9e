#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    countryconfig_mdg::run().await
}
