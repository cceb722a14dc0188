use std::process::ExitCode;
use std::sync::Arc;
use webs_demo::{DemoConfig, build_app, server};
use webs_log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    webs_log::init();

    let config = match DemoConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(target: "webs::demo", "{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(target: "webs::demo", "webs sample, sessions: {:?}", config.session.backend);

    let app = match build_app(&config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!(target: "webs::demo", "{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server::listen(app, config.addr).await {
        error!(target: "webs::demo", "{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
