//! mms-tts - text-to-speech for Indian languages.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use mms_tts_rs::{
    audio,
    cache::ModelCache,
    config::{GenerateArgs, ModelArgs, ServeArgs},
    engines::mms::MmsLoader,
    service::TtsService,
};

/// MMS-TTS - speech synthesis for Gujarati, Hindi and other Indian languages
#[derive(Parser)]
#[command(name = "mms-tts", author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start the HTTP server (JSON API and browser form)
    Serve(ServeArgs),

    /// Convert text to a WAV file
    Generate(GenerateArgs),

    /// List the configured languages and their models
    Languages(ModelArgs),
}

fn build_cache(model: &ModelArgs) -> Arc<ModelCache> {
    let loader = MmsLoader::new(model.mms_params());
    Arc::new(ModelCache::new(Box::new(loader), model.registry()))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Commands::Serve(serve) => {
            let cache = build_cache(&serve.model);
            if serve.preload {
                let cache = Arc::clone(&cache);
                let language = serve.model.default_language();
                tokio::task::spawn_blocking(move || cache.get_or_load(&language).map(|_| ()))
                    .await??;
            }
            let service = TtsService::new(cache, serve.service_config());
            mms_tts_rs::server::start_server(service, serve.server_config()).await
        }
        Commands::Generate(generate) => {
            // CPU-bound, run synchronously
            let service = TtsService::new(build_cache(&generate.model), generate.service_config());
            let start = Instant::now();
            let speech = service.text_to_speech(&generate.text, None)?;
            let result = audio::read_wav(&speech.file)?;
            println!(
                "Wrote {:.2}s of audio at {}Hz to {} in {:.2?}",
                result.duration_secs(),
                speech.sampling_rate,
                speech.file.display(),
                start.elapsed()
            );
            Ok(())
        }
        Commands::Languages(model) => {
            let default = model.default_language();
            for (key, model_id) in model.registry().iter() {
                let marker = if *key == default { "*" } else { " " };
                println!("{marker} {key:<12} {model_id}");
            }
            Ok(())
        }
    }
}
