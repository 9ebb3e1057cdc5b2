use tracing::{debug, info};

use crate::commands::send_chunked;
use crate::location::SharedPosition;
use crate::render::render_doctors;
use crate::requests::RequestKind;
use crate::state::Context;

/// Find highly rated doctors near you for your symptoms
#[poise::command(slash_command)]
pub async fn doctors(
    ctx: Context<'_>,
    #[description = "Symptoms to find a specialist for"] symptoms: String,
    #[description = "Your latitude (share to enable the search)"] latitude: Option<f64>,
    #[description = "Your longitude (share to enable the search)"] longitude: Option<f64>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    let Some(request) = ctx
        .data()
        .requests
        .begin(user_id, RequestKind::DoctorLookup)
    else {
        ctx.say("Already looking for doctors for you. Please wait for the results.")
            .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let options = ctx.data().config.read().await.model_options();
    let position = SharedPosition {
        latitude,
        longitude,
    };

    info!(
        user = %ctx.author().name,
        shared_location = latitude.is_some() || longitude.is_some(),
        "Doctor lookup started"
    );

    let outcome = ctx
        .data()
        .analyzer
        .locate_and_find_doctors(&position, &symptoms, &options)
        .await;

    if !request.is_current() {
        debug!(user_id, "stale doctor lookup result; discarded");
        return Ok(());
    }

    match outcome {
        Ok(result) => send_chunked(&ctx, &render_doctors(&result)).await,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            Ok(())
        }
    }
}
