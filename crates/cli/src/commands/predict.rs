//! Predict command - one image through the pipeline, plus the service wiring shared with `serve`

use anyhow::{Context, Result, bail};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use veggie_lens_adapters::{
    classifier::{HttpImageClassifier, StubImageClassifier},
    history::{EphemeralHistoryStore, SqliteHistoryStore},
    images::FsImageStore,
    llm::{LlmConfig, OllamaGenerator, OpenAiCompatGenerator, StubGenerator},
};
use veggie_lens_domain::usecases::{
    HistoryUseCase, PredictConfig, PredictUseCase, RecommendConfig, RecommendUseCase,
};
use veggie_lens_domain::{
    Clock, HistoryRecord, HistoryStore, ImageClassifier, ImageStore, ImageUpload, Locale,
    Nutrition, SystemClock, TextGenerator,
    policy::{UploadPolicy, content_type_for_path},
};

use crate::args::PredictArgs;
use crate::config::AppConfig;
use crate::http::PredictResponse;

pub type Pipeline = PredictUseCase<
    dyn ImageClassifier,
    dyn TextGenerator,
    dyn HistoryStore,
    dyn ImageStore,
    dyn Clock,
>;

/// Everything a request handler needs, built once at startup
pub struct Services {
    pub pipeline: Arc<Pipeline>,
    pub history: Arc<HistoryUseCase<dyn HistoryStore>>,
}

impl Services {
    pub fn new(
        classifier: Arc<dyn ImageClassifier>,
        generator: Arc<dyn TextGenerator>,
        history: Arc<dyn HistoryStore>,
        images: Arc<dyn ImageStore>,
        recommend: RecommendConfig,
        predict: PredictConfig,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let recommender = RecommendUseCase::new(generator, recommend);
        let pipeline = PredictUseCase::new(
            classifier,
            Arc::new(recommender),
            history.clone(),
            images,
            clock,
            predict,
        );

        Self {
            pipeline: Arc::new(pipeline),
            history: Arc::new(HistoryUseCase::new(history)),
        }
    }
}

pub async fn execute(args: PredictArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read image: {}", args.image.display()))?;
    let content_type = content_type_for_path(&args.image).unwrap_or("application/octet-stream");
    let filename = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let services = build_services(&config).await?;
    let record = services
        .pipeline
        .predict(ImageUpload::new(filename, content_type, bytes))
        .await
        .context("Prediction failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&PredictResponse::from(record))
            .context("Failed to serialize output")?;
        println!("{}", json);
    } else {
        print_record(&record);
    }

    Ok(())
}

pub(crate) async fn build_services(config: &AppConfig) -> Result<Services> {
    let locale: Locale = config
        .recommendation
        .locale
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let classifier = build_classifier(config)?;
    let generator = build_generator(config)?;
    let history = build_history_store(config).await?;
    let images: Arc<dyn ImageStore> = Arc::new(FsImageStore::new(&config.server.upload_dir));

    Ok(Services::new(
        classifier,
        generator,
        history,
        images,
        RecommendConfig {
            locale,
            timeout: Duration::from_secs(config.recommendation.timeout_secs),
        },
        PredictConfig {
            policy: UploadPolicy::with_max_bytes(config.server.max_upload_bytes),
            recommendations_enabled: config.recommendation.enabled,
        },
    ))
}

pub(crate) fn build_classifier(config: &AppConfig) -> Result<Arc<dyn ImageClassifier>> {
    match config.classifier.provider.as_str() {
        "http" => {
            let base_url = config.classifier.base_url.trim();
            if base_url.is_empty() {
                bail!("Classifier base_url is required");
            }
            let classifier = HttpImageClassifier::new(
                base_url,
                Duration::from_secs(config.classifier.timeout_secs),
            )
            .context("Failed to build classifier HTTP client")?;
            Ok(Arc::new(classifier))
        }
        "stub" => Ok(Arc::new(StubImageClassifier::default())),
        other => bail!("Unknown classifier provider: {}", other),
    }
}

/// Resolve `auto` to a concrete backend: hosted when its key is present, local otherwise
pub(crate) fn resolve_generation_provider(config: &AppConfig) -> Result<&'static str> {
    match config.recommendation.provider.as_str() {
        "hosted" => Ok("hosted"),
        "local" => Ok("local"),
        "stub" => Ok("stub"),
        "auto" => {
            let has_key = std::env::var(&config.recommendation.hosted.api_key_env)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false);
            Ok(if has_key { "hosted" } else { "local" })
        }
        other => bail!("Unknown recommendation provider: {}", other),
    }
}

pub(crate) fn build_generator(config: &AppConfig) -> Result<Arc<dyn TextGenerator>> {
    let rec = &config.recommendation;
    let provider = resolve_generation_provider(config)?;

    tracing::info!(
        provider = provider,
        configured = %rec.provider,
        "Selected generation backend"
    );

    match provider {
        "hosted" => {
            let api_key = load_api_key(&rec.hosted.api_key_env, "hosted")?;
            let generator =
                OpenAiCompatGenerator::new(api_key, &rec.hosted.base_url, llm_config(config, &rec.model))
                    .context("Failed to build hosted generation client")?;
            Ok(Arc::new(generator))
        }
        "local" => {
            let generator = OllamaGenerator::with_base_url(
                &rec.local.base_url,
                llm_config(config, &rec.local.model),
            )
            .context("Failed to build local generation client")?;
            Ok(Arc::new(generator))
        }
        _ => Ok(Arc::new(StubGenerator::offline())),
    }
}

fn llm_config(config: &AppConfig, model: &str) -> LlmConfig {
    LlmConfig {
        model: model.to_string(),
        temperature: config.recommendation.temperature,
        max_output_tokens: config.recommendation.max_output_tokens,
        timeout_secs: config.recommendation.timeout_secs,
    }
}

pub(crate) async fn build_history_store(config: &AppConfig) -> Result<Arc<dyn HistoryStore>> {
    match config.database.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            let store = SqliteHistoryStore::new(url)
                .await
                .with_context(|| format!("Failed to open history database: {}", url))?;
            tracing::info!(url = %url, "History persistence enabled");
            Ok(Arc::new(store))
        }
        _ => {
            tracing::warn!("No database configured, history will not be kept");
            Ok(Arc::new(EphemeralHistoryStore::new()))
        }
    }
}

pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No API key env var configured for provider {}", provider);
    }

    let key = std::env::var(env_var).with_context(|| {
        format!(
            "Missing API key env var {} for provider {}",
            env_var, provider
        )
    })?;

    if key.trim().is_empty() {
        bail!(
            "API key env var {} is empty for provider {}",
            env_var,
            provider
        );
    }

    Ok(SecretString::new(key.into()))
}

fn print_record(record: &HistoryRecord) {
    let c = &record.classification;

    println!("Prediction");
    println!("==========");
    println!();
    println!("Class: {} ({:.1}%)", c.label, c.confidence * 100.0);
    println!("Top 3:");
    for p in &c.alternatives {
        println!("  - {} ({:.1}%)", p.label, p.confidence * 100.0);
    }
    println!();

    let Some(rec) = &record.recommendation else {
        return;
    };

    println!("Recommendation");
    println!("==============");
    println!();
    println!("Recipes:");
    for recipe in &rec.recipes {
        println!("  - {}", recipe);
    }
    println!();
    println!("Nutrition:");
    match &rec.nutrition {
        Nutrition::Summary { info } => println!("  {}", info),
        Nutrition::Detailed {
            calories,
            vitamins,
            benefits,
        } => {
            if let Some(calories) = calories {
                println!("  Calories: {}", calories);
            }
            if let Some(vitamins) = vitamins {
                println!("  Vitamins: {}", vitamins.join(", "));
            }
            if let Some(benefits) = benefits {
                println!("  Benefits:");
                for b in benefits {
                    println!("    - {}", b);
                }
            }
        }
    }
    println!();
    println!("Storage: {}", rec.storage_tips);
    println!();
    println!("Record: {}", record.id);
}
