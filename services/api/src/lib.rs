mod cli;
mod infra;
mod predict;
mod routes;
mod server;

use shelter_signal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
