use crate::state::Context;

/// Configure analysis settings (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "default_language | model | temperature"] param: Option<String>,
    #[description = "New value (`default` resets model/temperature)"] value: Option<String>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    if !ctx.data().is_admin(user_id) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    match (param.as_deref(), value) {
        // Show current config
        (None, _) => {
            let config = ctx.data().config.read().await;
            ctx.say(format!(
                "**Analysis Configuration:**\n\
                 `default_language`: {}\n\
                 `model`: {}\n\
                 `temperature`: {}",
                config.default_language,
                config.model.as_deref().unwrap_or("(client default)"),
                config
                    .temperature
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "(model default)".to_string())
            ))
            .await?;
        }
        // Set a parameter
        (Some(key), Some(val)) => {
            let val = val.trim().to_string();
            let mut config = ctx.data().config.write().await;
            match key {
                "default_language" => {
                    if val.is_empty() {
                        ctx.say("`default_language` cannot be empty.").await?;
                    } else {
                        ctx.say(format!("`default_language` set to {}", val)).await?;
                        config.default_language = val;
                    }
                }
                "model" => {
                    config.model = (val != "default" && !val.is_empty()).then(|| val.clone());
                    ctx.say(format!(
                        "`model` set to {}",
                        config.model.as_deref().unwrap_or("(client default)")
                    ))
                    .await?;
                }
                "temperature" => {
                    if val == "default" {
                        config.temperature = None;
                        ctx.say("`temperature` reset to the model default").await?;
                    } else {
                        match val.parse::<f32>() {
                            Ok(t) if (0.0..=2.0).contains(&t) => {
                                config.temperature = Some(t);
                                ctx.say(format!("`temperature` set to {}", t)).await?;
                            }
                            _ => {
                                ctx.say("`temperature` must be a number between 0 and 2.")
                                    .await?;
                            }
                        }
                    }
                }
                _ => {
                    ctx.say(format!(
                        "Unknown param `{}`. Valid: `default_language`, `model`, `temperature`",
                        key
                    ))
                    .await?;
                }
            }
        }
        (Some(_), None) => {
            ctx.say("Provide both `param` and `value`. Example: `/symptom config temperature 0.4`")
                .await?;
        }
    }

    Ok(())
}
