mod cli;
mod infra;
mod routes;
mod server;
mod verify;

use lourdes_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
