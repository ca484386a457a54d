use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::time::Instant;
use tokenizers::{Encoding, Tokenizer, TruncationParams, TruncationStrategy};
use tracing::{debug, error, info};

use super::config::QaModelConfig;
use super::span::best_span;
use super::{AnswerExtractor, QaAnswer};
use crate::scoring::ScoringError;
use crate::TARGET_MODEL;

/// Sequence id the tokenizer assigns to the context in a (question, context) pair.
const CONTEXT_SEQUENCE: usize = 1;

/// BERT encoder with a span-prediction head (`qa_outputs`), run on candle.
pub struct BertQuestionAnswering {
    model: BertModel,
    qa_outputs: Linear,
    tokenizer: Tokenizer,
    device: Device,
    max_answer_len: usize,
}

impl BertQuestionAnswering {
    /// Load the model files named by `config`. Files must already be cached,
    /// see [`QaModelConfig::ensure_models_exist`].
    pub fn load(config: &QaModelConfig) -> Result<Self> {
        let start = Instant::now();
        info!(target: TARGET_MODEL, "Starting to load QA model {}", config.handle);

        let config_json = std::fs::read_to_string(config.config_path())
            .with_context(|| format!("Failed to read {}", config.config_path().display()))?;
        let mut bert_config: BertConfig =
            serde_json::from_str(&config_json).context("Failed to parse model config")?;
        // Checkpoints with a task head keep the encoder weights under `bert.`
        if bert_config.model_type.is_none() {
            bert_config.model_type = Some("bert".to_string());
        }

        let tensors = match candle_core::safetensors::load_buffer(
            &std::fs::read(config.weights_path())
                .with_context(|| format!("Failed to read {}", config.weights_path().display()))?,
            &config.device,
        ) {
            Ok(t) => t,
            Err(e) => {
                error!(target: TARGET_MODEL, "!!! Failed to load model tensors: {}", e);
                return Err(anyhow!("Failed to load model tensors"));
            }
        };
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &config.device);

        let model = BertModel::load(vb.clone(), &bert_config).map_err(|e| {
            error!(target: TARGET_MODEL, "!!! Failed to load BERT encoder: {}", e);
            anyhow!("Failed to load BERT encoder")
        })?;
        let qa_outputs = candle_nn::linear(bert_config.hidden_size, 2, vb.pp("qa_outputs"))
            .map_err(|e| {
                error!(target: TARGET_MODEL, "!!! Failed to load span head: {}", e);
                anyhow!("Failed to load span head")
            })?;

        let mut tokenizer = Tokenizer::from_file(config.tokenizer_path())
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_seq_len,
                strategy: TruncationStrategy::OnlySecond,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(None);

        info!(target: TARGET_MODEL, "Loaded QA model {} in {:?}", config.handle, start.elapsed());

        Ok(Self {
            model,
            qa_outputs,
            tokenizer,
            device: config.device.clone(),
            max_answer_len: config.max_answer_len,
        })
    }

    /// Start and end logits for every position of the encoded pair.
    fn span_logits(&self, encoding: &Encoding) -> candle_core::Result<(Vec<f32>, Vec<f32>)> {
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden_state = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let logits = self.qa_outputs.forward(&hidden_state)?.squeeze(0)?;

        let rows = logits.to_dtype(DType::F32)?.to_vec2::<f32>()?;
        let start = rows.iter().map(|row| row[0]).collect();
        let end = rows.iter().map(|row| row[1]).collect();
        Ok((start, end))
    }
}

impl AnswerExtractor for BertQuestionAnswering {
    fn infer(&self, question: &str, context: &str) -> Result<QaAnswer, ScoringError> {
        let start_time = Instant::now();

        let encoding = self
            .tokenizer
            .encode((question, context), true)
            .map_err(|e| ScoringError::ModelUnavailable(format!("tokenization failed: {}", e)))?;

        let context_mask: Vec<bool> = encoding
            .get_sequence_ids()
            .iter()
            .zip(encoding.get_special_tokens_mask())
            .map(|(seq, &special)| *seq == Some(CONTEXT_SEQUENCE) && special == 0)
            .collect();
        if !context_mask.iter().any(|&c| c) {
            return Err(ScoringError::ModelUnavailable(
                "no context tokens left after truncation".to_string(),
            ));
        }

        let (start_logits, end_logits) = self
            .span_logits(&encoding)
            .map_err(|e| ScoringError::ModelUnavailable(format!("inference failed: {}", e)))?;

        let span = best_span(
            &start_logits,
            &end_logits,
            &context_mask,
            Some(0),
            self.max_answer_len,
        )
        .ok_or_else(|| ScoringError::ModelUnavailable("no answer span found".to_string()))?;

        let offsets = encoding.get_offsets();
        let char_start = offsets[span.start].0;
        let char_end = offsets[span.end].1;
        let answer = context.get(char_start..char_end).unwrap_or_default().to_string();

        debug!(
            target: TARGET_MODEL,
            "QA inference: {} tokens; span {}..={} '{}'; score {:.4}; took {:?}",
            encoding.get_ids().len(),
            span.start,
            span.end,
            answer,
            span.score,
            start_time.elapsed()
        );

        Ok(QaAnswer {
            answer,
            score: span.score,
            start: char_start,
            end: char_end,
        })
    }
}
