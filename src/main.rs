#[tokio::main]
async fn main() {
    if let Err(e) = sys_marker_scan::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
