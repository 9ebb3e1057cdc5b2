use crate::commands::send_chunked;
use crate::render::{render_history, render_recall};
use crate::requests::RequestKind;
use crate::state::Context;
use tracing::info;

/// Show your recent analyses
#[poise::command(slash_command)]
pub async fn history(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let items = ctx.data().history.list(ctx.author().id.get()).await?;
    send_chunked(&ctx, &render_history(&items)).await
}

/// Show a past analysis again
#[poise::command(slash_command)]
pub async fn recall(
    ctx: Context<'_>,
    #[description = "Number from /symptom history (1 = most recent)"]
    #[min = 1]
    #[max = 10]
    index: u32,
) -> Result<(), anyhow::Error> {
    let position = (index as usize).saturating_sub(1);
    match ctx
        .data()
        .history
        .get(ctx.author().id.get(), position)
        .await?
    {
        Some(item) => send_chunked(&ctx, &render_recall(&item)).await,
        None => {
            ctx.say(format!(
                "No analysis #{}. Use `/symptom history` to see what is saved.",
                index
            ))
            .await?;
            Ok(())
        }
    }
}

/// Clear your analysis history
#[poise::command(slash_command)]
pub async fn clear(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    // An analysis finishing after this must not bring the history back.
    ctx.data().requests.invalidate(user_id, RequestKind::Analysis);
    ctx.data().history.clear(user_id).await?;
    info!(user = %ctx.author().name, "History cleared");
    ctx.say("History cleared.").await?;
    Ok(())
}
