use crate::cli::OutputFormat;
use crate::{config, server};

pub async fn handle(_output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    server::init_tracing(config);
    server::serve(config).await
}
