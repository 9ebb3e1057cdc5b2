mod analyze;
mod config;
mod doctors;
mod history;

use crate::render::{split_chunks, MAX_MESSAGE_LEN};
use crate::state::Context;

/// Symptom checker - describe symptoms, get an AI assessment and nearby doctors
#[poise::command(
    slash_command,
    subcommands(
        "analyze::analyze",
        "doctors::doctors",
        "history::history",
        "history::recall",
        "history::clear",
        "config::config"
    )
)]
pub async fn symptom(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Send a message in Discord-safe chunks.
/// Uses ctx.say() for all chunks; poise routes follow-ups through the
/// interaction webhook, which doesn't require Send Messages channel permission.
pub(crate) async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text, MAX_MESSAGE_LEN) {
        ctx.say(chunk).await?;
    }
    Ok(())
}
