use std::error::Error;

use ordering::executable_utils::{initialize_executable, initialize_tracing, run_backend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting backend...");
    let config = initialize_executable()?;
    initialize_tracing(&config.backend.log_level);
    run_backend(config).await
}
