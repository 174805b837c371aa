//! Binary entrypoint for the estate admin console.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = estate_admin_cli::run().await;
    std::process::exit(exit_code);
}
