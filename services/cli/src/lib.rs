mod cli;
mod pipeline;

use risk_features::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
