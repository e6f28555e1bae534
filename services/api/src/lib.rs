mod cli;
mod console;
mod infra;
mod routes;
mod server;

use shelter_alloc::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
