use poise::serenity_prelude as serenity;
use tracing::{debug, info, warn};

use crate::analysis::types::ImageInput;
use crate::analysis::AnalysisError;
use crate::commands::send_chunked;
use crate::render::render_analysis;
use crate::requests::RequestKind;
use crate::state::Context;

/// Gemini's inline-data ceiling.
const MAX_IMAGE_BYTES: u32 = 20 * 1024 * 1024;

const SUPPORTED_LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Dutch",
    "Russian",
    "Arabic",
    "Hindi",
    "Bengali",
    "Urdu",
    "Tamil",
    "Telugu",
    "Chinese (Simplified)",
    "Japanese",
    "Korean",
    "Vietnamese",
    "Indonesian",
    "Turkish",
    "Swahili",
];

/// Analyze symptoms from a description and/or a photo
#[poise::command(slash_command)]
pub async fn analyze(
    ctx: Context<'_>,
    #[description = "Describe what you are experiencing"] symptoms: Option<String>,
    #[description = "Photo of a visible symptom (rash, swelling, ...)"]
    image: Option<serenity::Attachment>,
    #[description = "Language for the answer"]
    #[autocomplete = "autocomplete_language"]
    language: Option<String>,
) -> Result<(), anyhow::Error> {
    let symptoms = symptoms.unwrap_or_default();
    if symptoms.trim().is_empty() && image.is_none() {
        ctx.say("Describe your symptoms or attach an image to analyze.")
            .await?;
        return Ok(());
    }

    if let Some(attachment) = &image {
        let is_image = attachment
            .content_type
            .as_deref()
            .is_some_and(|t| t.starts_with("image/"));
        if !is_image {
            ctx.say("The attachment must be an image (PNG, JPEG, WEBP, ...).")
                .await?;
            return Ok(());
        }
        if attachment.size > MAX_IMAGE_BYTES {
            ctx.say("That image is too large. Please attach one under 20 MB.")
                .await?;
            return Ok(());
        }
    }

    let user_id = ctx.author().id.get();
    let Some(request) = ctx.data().requests.begin(user_id, RequestKind::Analysis) else {
        ctx.say("Your previous analysis is still running. Please wait for it to finish.")
            .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let config = ctx.data().config.read().await;
    let language = language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| config.default_language.clone());
    let options = config.model_options();
    drop(config);

    info!(
        user = %ctx.author().name,
        has_image = image.is_some(),
        language,
        "Symptom analysis started"
    );

    let image = match &image {
        Some(attachment) => match attachment.download().await {
            Ok(bytes) => Some(ImageInput {
                bytes,
                mime_type: attachment
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "image/jpeg".to_string()),
            }),
            Err(e) => {
                warn!(error = %e, "image download failed");
                ctx.say(AnalysisError::Request(e.into()).to_string()).await?;
                return Ok(());
            }
        },
        None => None,
    };

    let result = match ctx
        .data()
        .analyzer
        .analyze(&symptoms, image.as_ref(), &language, &options)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    if request.is_current() {
        if let Err(e) = ctx
            .data()
            .history
            .record(user_id, &symptoms, result.clone())
            .await
        {
            warn!(user_id, error = %e, "failed to save analysis to history");
        }
    } else {
        debug!(user_id, "stale analysis result; not saved to history");
    }

    send_chunked(&ctx, &render_analysis(&result)).await
}

fn matching_languages(partial: &str) -> Vec<String> {
    let partial = partial.to_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .filter(|l| l.to_lowercase().contains(&partial))
        .take(25)
        .map(|l| l.to_string())
        .collect()
}

/// Autocomplete for the answer language. Free text is accepted as well.
async fn autocomplete_language(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching_languages(partial)
}
