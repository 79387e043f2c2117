mod analyze;
mod cli;
mod infra;
mod routes;
mod server;

use deal_engine::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
