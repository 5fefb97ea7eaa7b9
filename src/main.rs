use infoblox_azure_setup::{
    configure, render_summary, write_summary, ArmClient, DefaultCredential, Error, GraphClient,
    Inputs, TokenCredential, ARM_ENDPOINT, GRAPH_ENDPOINT, SUMMARY_FILE,
};
use log::error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Azure Discovery and Configuration for Infoblox          ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let inputs = Inputs::from_env()?;
    let credential: Arc<dyn TokenCredential> = Arc::new(DefaultCredential::from_env()?);

    let arm = ArmClient::builder(ARM_ENDPOINT)?
        .credential(credential.clone())
        .build()?;
    let graph = GraphClient::builder(GRAPH_ENDPOINT)?
        .credential(credential)
        .build()?;

    let report = configure(&arm, &graph, &inputs)?;

    let summary = render_summary(&report);
    write_summary(SUMMARY_FILE, &summary)?;
    println!("{summary}");
    Ok(())
}
