use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    harvest_app::run(std::env::args().skip(1)).await
}
