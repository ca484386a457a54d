use anyhow::{bail, Context, Result};
use aqgs::environment::Settings;
use aqgs::ingest::{parse_uploaded_files, PlainTextExtractor, UploadedFile};
use aqgs::lexicon::{Lexicon, MemoryLexicon};
use aqgs::model::{AnswerExtractor, UnavailableExtractor};
use aqgs::scoring::{
    calculate_score, AnswerEvaluator, LemmaFilter, Passage, ScoredAnswer, SynonymExpander,
};
use aqgs::startup;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::main;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read synonyms from a JSON lexicon instead of the WordNet database
    #[arg(long, global = true)]
    lexicon_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a student answer against an expert answer
    Evaluate {
        /// Student answer text
        #[arg(short, long)]
        student: Option<String>,

        /// Expert answer text
        #[arg(short, long)]
        expert: Option<String>,

        /// Skip the QA model; completion scores are 0.0
        #[arg(long)]
        no_model: bool,
    },

    /// Score files of answers line by line
    Batch {
        /// File with one student answer per line
        #[arg(short, long)]
        student_file: PathBuf,

        /// File with one expert answer per line
        #[arg(short, long)]
        expert_file: PathBuf,

        /// Skip the QA model; completion scores are 0.0
        #[arg(long)]
        no_model: bool,
    },

    /// Combine precomputed signals into a final score
    Score {
        /// Number of matched keywords
        #[arg(short, long)]
        matched: usize,

        /// Completion score (0.0-1.0)
        #[arg(short, long, default_value = "0.0")]
        completion: f64,

        /// Intent score (0.0-1.0)
        #[arg(short, long, default_value = "0.0")]
        intent: f64,
    },

    /// Show the keywords extracted from a text
    Keywords {
        text: String,
    },

    /// Show the synonyms of a word
    Synonyms {
        word: String,

        /// Drop multi-word lemmas
        #[arg(long)]
        single_words: bool,
    },

    /// Show multiple-choice distractors for a word
    Distractors {
        word: String,
    },

    /// Extract and concatenate the text of uploaded documents
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::Evaluate {
            student,
            expert,
            no_model,
        } => {
            let lexicon = load_lexicon(cli.lexicon_json.as_deref(), &settings)?;
            let extractor = load_extractor(&settings, no_model).await;
            let evaluator = startup::evaluator(&settings, lexicon, extractor);

            let (student, expert) =
                AnswerEvaluator::resolve_passages(student.as_deref(), expert.as_deref())?;
            let scored = ScoredAnswer::from(evaluator.evaluate(&student, &expert).await);
            println!("{}", serde_json::to_string_pretty(&scored)?);
        }
        Commands::Batch {
            student_file,
            expert_file,
            no_model,
        } => {
            let students = read_passage(&student_file)?;
            let experts = read_passage(&expert_file)?;

            let lexicon = load_lexicon(cli.lexicon_json.as_deref(), &settings)?;
            let extractor = load_extractor(&settings, no_model).await;
            let evaluator = startup::evaluator(&settings, lexicon, extractor);

            let results = evaluator.evaluate_batch(&students, &experts).await;
            info!("Scored {} answer pairs", results.len());
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Score {
            matched,
            completion,
            intent,
        } => {
            println!("{:.4}", calculate_score(matched, completion, intent));
        }
        Commands::Keywords { text } => {
            let passage = Passage::new(text);
            let tokens = startup::keyword_extractor(&settings).extract_keywords(passage.as_str());
            for token in tokens.iter() {
                println!("{}", token);
            }
        }
        Commands::Synonyms { word, single_words } => {
            let lexicon = load_lexicon(cli.lexicon_json.as_deref(), &settings)?;
            let filter = LemmaFilter::scoring().with_multiword(!single_words);
            for lemma in SynonymExpander::new(lexicon).synonyms_for(&word, &filter).iter() {
                println!("{}", lemma);
            }
        }
        Commands::Distractors { word } => {
            let lexicon = load_lexicon(cli.lexicon_json.as_deref(), &settings)?;
            let distractors = startup::distractor_generator(&settings, lexicon).distractors_for(&word);
            if distractors.len() < settings.distractor_limit {
                info!(
                    "Only {} of {} distractors found for '{}'",
                    distractors.len(),
                    settings.distractor_limit,
                    word
                );
            }
            for distractor in distractors {
                println!("{}", distractor);
            }
        }
        Commands::Extract { files } => {
            let uploads = files
                .iter()
                .map(|path| {
                    UploadedFile::read(path)
                        .with_context(|| format!("Failed to read {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;
            let content = parse_uploaded_files(&PlainTextExtractor, &uploads)?;
            print!("{}", content);
        }
    }

    Ok(())
}

fn load_lexicon(json: Option<&Path>, settings: &Settings) -> Result<Arc<dyn Lexicon>> {
    match json {
        Some(path) => Ok(Arc::new(MemoryLexicon::from_json_file(path)?)),
        None => startup::load_lexicon(settings),
    }
}

async fn load_extractor(settings: &Settings, no_model: bool) -> Arc<dyn AnswerExtractor> {
    if no_model {
        Arc::new(UnavailableExtractor::new("disabled on the command line"))
    } else {
        startup::load_extractor(settings).await
    }
}

fn read_passage(path: &Path) -> Result<Passage> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    match Passage::from_bytes(&bytes) {
        Ok(passage) => Ok(passage),
        Err(e) => bail!("{}: {}", path.display(), e),
    }
}
