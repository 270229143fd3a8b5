mod cli;
mod infra;
mod operator;
mod routes;
mod server;

use tenant_site::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
