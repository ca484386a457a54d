use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::model::ModelHandle;
use crate::scoring::default_inference_slots;

pub const DEFAULT_QA_MODEL_NAME: &str = "deepset/bert-base-cased-squad2";
pub const DEFAULT_QA_MODEL_REVISION: &str = "main";

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// Empty segments are dropped, so an unset variable yields an empty vector.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `delimiter`: The character to split the environment variable's value by.
///
/// # Returns
/// - `Vec<String>`
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Retrieves an environment variable parsed as `T`, falling back to `default` when the
/// variable is unset or does not parse.
pub fn get_env_var_or<T: FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Inference timeout from a number of seconds. Zero would time out every
/// inference, so the floor is one second.
pub fn qa_timeout_from_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub wordnet_dir: PathBuf,
    pub models_dir: PathBuf,
    pub qa_model: ModelHandle,
    pub qa_weights_file: String,
    pub qa_max_seq_len: usize,
    pub qa_max_answer_len: usize,
    pub qa_timeout: Duration,
    pub qa_max_concurrent_inferences: usize,
    pub extra_stopwords: Vec<String>,
    pub distractor_limit: usize,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wordnet_dir: PathBuf::from("wordnet"),
            models_dir: PathBuf::from("models"),
            qa_model: ModelHandle::new(DEFAULT_QA_MODEL_NAME, DEFAULT_QA_MODEL_REVISION),
            qa_weights_file: "model.safetensors".to_string(),
            qa_max_seq_len: 384,
            qa_max_answer_len: 15,
            qa_timeout: Duration::from_secs(30),
            qa_max_concurrent_inferences: default_inference_slots(),
            extra_stopwords: Vec::new(),
            distractor_limit: 3,
            port: 8080,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let qa_model = ModelHandle::new(
            env::var("QA_MODEL_NAME").unwrap_or(defaults.qa_model.name.clone()),
            env::var("QA_MODEL_REVISION").unwrap_or(defaults.qa_model.revision.clone()),
        );

        Self {
            wordnet_dir: env::var("WORDNET_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.wordnet_dir),
            models_dir: env::var("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            qa_model,
            qa_weights_file: env::var("QA_MODEL_WEIGHTS").unwrap_or(defaults.qa_weights_file),
            qa_max_seq_len: get_env_var_or("QA_MAX_SEQ_LEN", defaults.qa_max_seq_len),
            qa_max_answer_len: get_env_var_or("QA_MAX_ANSWER_LEN", defaults.qa_max_answer_len),
            qa_timeout: qa_timeout_from_secs(get_env_var_or(
                "QA_TIMEOUT_SECS",
                defaults.qa_timeout.as_secs(),
            )),
            qa_max_concurrent_inferences: get_env_var_or(
                "QA_MAX_CONCURRENT_INFERENCES",
                defaults.qa_max_concurrent_inferences,
            )
            .max(1),
            extra_stopwords: get_env_var_as_vec("EXTRA_STOPWORDS", ';'),
            distractor_limit: get_env_var_or("DISTRACTOR_LIMIT", defaults.distractor_limit),
            port: get_env_var_or("PORT", defaults.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_as_vec_drops_empty_segments() {
        env::set_var("AQGS_TEST_LIST", " alpha; ;beta ;");
        assert_eq!(
            get_env_var_as_vec("AQGS_TEST_LIST", ';'),
            vec!["alpha".to_string(), "beta".to_string()]
        );
        assert!(get_env_var_as_vec("AQGS_TEST_LIST_UNSET", ';').is_empty());
    }

    #[test]
    fn test_env_var_or_falls_back_on_parse_error() {
        env::set_var("AQGS_TEST_PORT", "not-a-number");
        assert_eq!(get_env_var_or("AQGS_TEST_PORT", 8080u16), 8080);
        env::set_var("AQGS_TEST_PORT_OK", " 9000 ");
        assert_eq!(get_env_var_or("AQGS_TEST_PORT_OK", 8080u16), 9000);
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.qa_model.name, DEFAULT_QA_MODEL_NAME);
        assert_eq!(settings.qa_max_answer_len, 15);
        assert_eq!(settings.distractor_limit, 3);
        assert!(settings.qa_max_concurrent_inferences >= 1);
    }

    #[test]
    fn test_qa_timeout_has_a_floor() {
        assert_eq!(qa_timeout_from_secs(0), Duration::from_secs(1));
        assert_eq!(qa_timeout_from_secs(45), Duration::from_secs(45));
    }
}
