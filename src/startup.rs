//! Construction of the process-wide resources shared by every evaluation.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

use crate::environment::Settings;
use crate::lexicon::{Lexicon, WordNetLexicon};
use crate::model::{AnswerExtractor, BertQuestionAnswering, QaModelConfig, UnavailableExtractor};
use crate::questions::DistractorGenerator;
use crate::scoring::{
    AnswerEvaluator, CompletionScorer, KeywordExtractor, RuleBasedTokenizer, SynonymExpander,
};
use crate::TARGET_MODEL;

pub fn keyword_extractor(settings: &Settings) -> KeywordExtractor {
    let tokenizer = RuleBasedTokenizer::new().with_extra_stopwords(&settings.extra_stopwords);
    KeywordExtractor::new(Arc::new(tokenizer))
}

/// Read the WordNet database from `settings.wordnet_dir`.
pub fn load_lexicon(settings: &Settings) -> Result<Arc<dyn Lexicon>> {
    let lexicon = WordNetLexicon::load(&settings.wordnet_dir).with_context(|| {
        format!(
            "Failed to load WordNet from {}",
            settings.wordnet_dir.display()
        )
    })?;
    Ok(Arc::new(lexicon))
}

/// Fetch and load the QA model. Any failure installs an extractor that is
/// always unavailable, so completion scores degrade to 0.0.
pub async fn load_extractor(settings: &Settings) -> Arc<dyn AnswerExtractor> {
    let config = QaModelConfig::from_settings(settings);

    if let Err(e) = config.ensure_models_exist().await {
        warn!(target: TARGET_MODEL, "QA model {} could not be fetched: {:#}", config.handle, e);
        return Arc::new(UnavailableExtractor::new(format!("{:#}", e)));
    }

    match tokio::task::spawn_blocking(move || BertQuestionAnswering::load(&config)).await {
        Ok(Ok(model)) => Arc::new(model),
        Ok(Err(e)) => {
            warn!(target: TARGET_MODEL, "QA model failed to load: {:#}", e);
            Arc::new(UnavailableExtractor::new(format!("{:#}", e)))
        }
        Err(e) => {
            warn!(target: TARGET_MODEL, "QA model loader aborted: {}", e);
            Arc::new(UnavailableExtractor::new(e.to_string()))
        }
    }
}

pub fn evaluator(
    settings: &Settings,
    lexicon: Arc<dyn Lexicon>,
    extractor: Arc<dyn AnswerExtractor>,
) -> AnswerEvaluator {
    AnswerEvaluator::new(
        keyword_extractor(settings),
        SynonymExpander::new(lexicon),
        CompletionScorer::new(extractor, settings.qa_timeout)
            .with_max_concurrent_inferences(settings.qa_max_concurrent_inferences),
    )
}

pub fn distractor_generator(settings: &Settings, lexicon: Arc<dyn Lexicon>) -> DistractorGenerator {
    DistractorGenerator::new(SynonymExpander::new(lexicon), settings.distractor_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::MemoryLexicon;
    use crate::scoring::Passage;
    use std::time::Duration;

    #[test]
    fn test_extra_stopwords_are_applied() {
        let settings = Settings {
            extra_stopwords: vec!["Cell".to_string()],
            ..Settings::default()
        };
        let tokens = keyword_extractor(&settings).extract_keywords("The cell wall");
        assert_eq!(tokens.iter().collect::<Vec<_>>(), vec!["wall"]);
    }

    #[test]
    fn test_evaluator_uses_inference_limit() {
        let settings = Settings {
            qa_max_concurrent_inferences: 2,
            ..Settings::default()
        };
        let lexicon: Arc<dyn Lexicon> = Arc::new(MemoryLexicon::new());
        let extractor: Arc<dyn AnswerExtractor> = Arc::new(UnavailableExtractor::new("off"));
        let evaluator = evaluator(&settings, lexicon, extractor);
        assert_eq!(evaluator.completion_scorer().available_inference_slots(), 2);
    }

    #[test]
    fn test_missing_wordnet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            wordnet_dir: dir.path().join("absent"),
            ..Settings::default()
        };
        assert!(load_lexicon(&settings).is_err());
    }

    #[tokio::test]
    async fn test_missing_model_files_degrade() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("local--qa").join("v0");
        std::fs::create_dir_all(&model_dir).unwrap();
        for file in ["config.json", "tokenizer.json", "model.safetensors"] {
            std::fs::write(model_dir.join(file), b"not a model").unwrap();
        }
        let settings = Settings {
            models_dir: dir.path().to_path_buf(),
            qa_model: crate::model::ModelHandle::new("local/qa", "v0"),
            qa_timeout: Duration::from_secs(1),
            ..Settings::default()
        };

        let extractor = load_extractor(&settings).await;
        assert!(extractor.infer("question", "context").is_err());

        let lexicon: Arc<dyn Lexicon> = Arc::new(MemoryLexicon::new());
        let evaluator = evaluator(&settings, lexicon, extractor);
        let components = evaluator.evaluate_answer(
            &Passage::new("cell"),
            &Passage::new("cell"),
        );
        assert_eq!(components.completion_score, 0.0);
        assert_eq!(components.degraded.len(), 1);
    }
}
