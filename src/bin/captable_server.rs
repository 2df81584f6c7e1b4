//! Carta Cap Table API Server binary

use carta_captable::api::{run_api_server, server::ApiConfig};
use carta_captable::config::TransformConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "carta-captable-server")]
#[command(version)]
#[command(about = "Carta Cap Table API Server - HTTP access to the template transformer")]
#[command(long_about = r#"
Carta Cap Table API Server

Endpoints:
  - POST /api/v1/transform - Populate a template from an export
  - POST /api/v1/inspect   - Parse an export without writing anything
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Paths in requests are local to the server.

Example usage:
  carta-captable-server                       # Start on localhost:8080
  carta-captable-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/transform \
    -H "Content-Type: application/json" \
    -d '{"export_path": "export.xlsx", "template_path": "template.xlsx"}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "CARTA_CAPTABLE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "CARTA_CAPTABLE_PORT")]
    port: u16,

    /// Layout configuration file (YAML)
    #[arg(short, long, env = "CARTA_CAPTABLE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let transform = TransformConfig::load_or_default(args.config.as_deref())?;

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, transform).await
}
