use anyhow::Result;
use tracing::info;

use aqgs::environment::Settings;
use aqgs::logging::configure_logging;
use aqgs::startup;
use aqgs::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let settings = Settings::from_env();
    info!(
        "Starting with QA model {}, WordNet at {}",
        settings.qa_model,
        settings.wordnet_dir.display()
    );

    let lexicon = startup::load_lexicon(&settings)?;
    let extractor = startup::load_extractor(&settings).await;
    let evaluator = startup::evaluator(&settings, lexicon, extractor);

    web::serve(AppState::new(evaluator), settings.port).await
}
