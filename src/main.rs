use fluxgen::{
    logger, presets, GenerationResult, ImageFormat, ImageStudio, InferenceInput, StudioConfig,
    StudioEvent,
};
use futures::StreamExt;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = StudioConfig::from_env()?;
    logger::log_config_info(&config);

    let studio = match ImageStudio::from_config(config) {
        Ok(studio) => studio,
        Err(e) => {
            fluxgen::log_error!("Failed to initialize backend: {}", e);
            return Err(e.into());
        }
    };
    logger::log_startup_info("fluxgen", env!("CARGO_PKG_VERSION"), studio.backend().name());

    if !studio.backend().health_check().await.unwrap_or(false) {
        fluxgen::log_warn!("Backend health check failed, trying anyway");
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let prompt = if args.is_empty() {
        let prompt = presets::example(0).unwrap_or_default().to_string();
        log::info!("No prompt given, using example: {}", prompt);
        prompt
    } else {
        args.join(" ")
    };

    let mut input = InferenceInput::with_defaults(prompt, &studio.config().defaults);
    if let Some(seed) = env::var("FLUXGEN_SEED").ok().and_then(|s| s.parse().ok()) {
        input = input.with_seed(seed, false);
    }

    let mut events = studio.generate_stream(input);
    let mut result = None;

    while let Some(event) = events.next().await {
        match event {
            StudioEvent::Progress(update) => {
                log::info!(
                    "⏳ Step {}/{} ({:.0}%)",
                    update.step,
                    update.total_steps,
                    update.fraction * 100.0
                );
            }
            StudioEvent::Finished(outcome) => {
                result = Some(outcome);
                break;
            }
        }
    }

    let result = match result {
        Some(Ok(result)) => result,
        Some(Err(e)) => {
            fluxgen::log_error!("Generation failed: {}", e);
            return Err(e.into());
        }
        None => return Err("generation ended without a result".into()),
    };

    fluxgen::log_info!("Seeds used: {}", result.seeds_display());
    save_images(&result, Path::new("output"))?;

    Ok(())
}

fn save_images(result: &GenerationResult, dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;

    for (index, (image, seed)) in result.iter().enumerate() {
        let path = image_path(dir, index, seed, image.format);
        let bytes = match image.format {
            ImageFormat::Rgb8 => {
                let mut ppm = format!("P6\n{} {}\n255\n", image.width, image.height).into_bytes();
                ppm.extend_from_slice(&image.data);
                ppm
            }
            _ => image.data.clone(),
        };

        match fs::write(&path, bytes) {
            Ok(_) => log::info!("💾 Image saved to: {}", path.display()),
            Err(e) => log::error!("❌ Failed to save image {}: {}", path.display(), e),
        }
    }

    Ok(())
}

fn image_path(dir: &Path, index: usize, seed: u32, format: ImageFormat) -> PathBuf {
    let extension = match format {
        ImageFormat::Rgb8 => "ppm",
        other => other.extension(),
    };
    dir.join(format!(
        "image_{}_{}_{}.{}",
        chrono::Utc::now().timestamp(),
        index,
        seed,
        extension
    ))
}
