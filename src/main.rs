//! film-intent CLI: French movie questions → SELECT/WHERE intents.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use film_intent::catalog::{CatalogFormat, ConceptCatalog};
use film_intent::classify::{
    self, ClassWeight, Classifier, LogisticRegression, Perceptron, Target,
};
use film_intent::config::ExtractorConfig;
use film_intent::dataset::{self, LabelSource};
use film_intent::error::IntentError;
use film_intent::extract::IntentExtractor;
use film_intent::label::IntentLabel;
use film_intent::sql::{self, SqlLabelParser};

#[derive(Parser)]
#[command(
    name = "film-intent",
    version,
    about = "Extract SELECT/WHERE intents from French movie questions"
)]
struct Cli {
    /// Vocabulary file (TOML). Defaults to the built-in French/English set.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the intent of one question.
    Extract {
        /// Concept catalog (CSV).
        #[arg(long)]
        catalog: PathBuf,

        /// Catalog layout.
        #[arg(long, default_value = "columns")]
        format: FormatArg,

        /// Print the intent as JSON.
        #[arg(long)]
        json: bool,

        /// Also print the canonical label strings.
        #[arg(long)]
        label: bool,

        /// The question.
        query: String,
    },

    /// Print labels parsed from the SQL of a JSON corpus.
    Labels {
        /// Corpus file: JSON array of {"sql": ..., "query_french": ...}.
        #[arg(long)]
        file: PathBuf,
    },

    /// Build a CSV training dataset from a JSON corpus.
    Dataset {
        /// Corpus file (JSON).
        #[arg(long)]
        corpus: PathBuf,

        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,

        /// Where labels come from.
        #[arg(long, default_value = "sql")]
        source: SourceArg,

        /// Concept catalog, required with `--source rules`.
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Catalog layout.
        #[arg(long, default_value = "columns")]
        format: FormatArg,
    },

    /// Train and evaluate a classifier on a CSV dataset.
    Classify {
        /// Dataset CSV (query_french,select_label,where_label).
        #[arg(long)]
        dataset: PathBuf,

        /// Label column to predict.
        #[arg(long, default_value = "select")]
        target: TargetArg,

        /// Model family.
        #[arg(long, default_value = "perceptron")]
        model: ModelArg,

        /// Class weighting (logistic model only).
        #[arg(long, default_value = "none")]
        class_weight: WeightArg,

        /// Held-out fraction.
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Split and shuffle seed.
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Columns,
    Rows,
}

impl From<FormatArg> for CatalogFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Columns => CatalogFormat::Columns,
            FormatArg::Rows => CatalogFormat::Rows,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Sql,
    Rules,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    Select,
    Where,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Select => Target::Select,
            TargetArg::Where => Target::Where,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Perceptron,
    Logistic,
}

#[derive(Clone, Copy, ValueEnum)]
enum WeightArg {
    None,
    Balanced,
    /// Inverse label frequency over the whole dataset.
    Manual,
}

fn load_extractor(config: Option<&PathBuf>) -> Result<IntentExtractor> {
    let config = match config {
        Some(path) => ExtractorConfig::load(path).map_err(IntentError::from)?,
        None => ExtractorConfig::default(),
    };
    Ok(IntentExtractor::new(config).map_err(IntentError::from)?)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            catalog,
            format,
            json,
            label,
            query,
        } => {
            let extractor = load_extractor(cli.config.as_ref())?;
            let catalog =
                ConceptCatalog::load(&catalog, format.into()).map_err(IntentError::from)?;
            let intent = extractor.extract(&query, &catalog);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&intent).into_diagnostic()?
                );
            } else {
                println!("{intent}");
            }
            if label {
                println!("{}", IntentLabel::from(&intent));
            }
        }

        Commands::Labels { file } => {
            let entries = sql::load_corpus(&file).map_err(IntentError::from)?;
            let labels = SqlLabelParser::default().label_corpus(&entries);
            if labels.is_empty() {
                println!("No SQL labels found in {}", file.display());
            }
            for named in &labels {
                println!("{named}");
            }
        }

        Commands::Dataset {
            corpus,
            output,
            source,
            catalog,
            format,
        } => {
            let entries = sql::load_corpus(&corpus).map_err(IntentError::from)?;
            let rows = match source {
                SourceArg::Sql => {
                    dataset::build_dataset(&entries, &LabelSource::Sql(SqlLabelParser::default()))
                }
                SourceArg::Rules => {
                    let Some(catalog) = catalog else {
                        miette::bail!("--source rules needs --catalog <csv>");
                    };
                    let extractor = load_extractor(cli.config.as_ref())?;
                    let catalog =
                        ConceptCatalog::load(&catalog, format.into()).map_err(IntentError::from)?;
                    dataset::build_dataset(
                        &entries,
                        &LabelSource::Rules {
                            extractor: &extractor,
                            catalog: &catalog,
                        },
                    )
                }
            };
            dataset::write_dataset(&output, &rows).map_err(IntentError::from)?;
            println!("Wrote {} rows to {}", rows.len(), output.display());
        }

        Commands::Classify {
            dataset: path,
            target,
            model,
            class_weight,
            test_size,
            seed,
        } => {
            let rows = dataset::read_dataset(&path).map_err(IntentError::from)?;
            let target = Target::from(target);

            let mut classifier: Box<dyn Classifier> = match model {
                ModelArg::Perceptron => Box::new(Perceptron::new().with_seed(seed)),
                ModelArg::Logistic => {
                    let weight = match class_weight {
                        WeightArg::None => ClassWeight::None,
                        WeightArg::Balanced => ClassWeight::Balanced,
                        WeightArg::Manual => {
                            let labels: Vec<String> =
                                rows.iter().map(|r| target.label(r).to_string()).collect();
                            ClassWeight::inverse_frequency(&labels)
                        }
                    };
                    Box::new(LogisticRegression::new(weight))
                }
            };

            let evaluation =
                classify::evaluate(&rows, target, classifier.as_mut(), test_size, seed)
                    .map_err(IntentError::from)?;
            print!("{evaluation}");
        }
    }

    Ok(())
}
