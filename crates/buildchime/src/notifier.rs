use tracing::{debug, info};

use crate::chat::{Attachment, ChatClient, Payload};
use crate::config::Profile;
use crate::context::BuildContext;
use crate::error::NotificationError;
use crate::message::{color, MessageText};

/// Send one build-status notification. Either the message is fully delivered
/// (after an optional successful login) or the run fails; there is no retry
/// and no partial success.
pub async fn execute(ctx: &BuildContext, cfg: &Profile) -> Result<(), NotificationError> {
    // Resolve and render the text first, so a broken template fails the run
    // before any network traffic.
    let text = MessageText::resolve(cfg.template.as_deref()).render(ctx)?;

    let attachment = Attachment {
        text,
        color: color(&ctx.build.status).to_string(),
        image_url: cfg.image_url.clone(),
    };

    let payload = Payload {
        channel: cfg.channel.clone(),
        username: cfg.username.clone(),
        icon_url: cfg.icon_url.clone(),
        icon_emoji: cfg.icon_emoji.clone(),
        attachments: vec![attachment],
    };

    let mut client = match (&cfg.user_id, &cfg.auth_token) {
        (Some(user_id), Some(auth_token)) => {
            ChatClient::with_session(&cfg.url, user_id, auth_token)
        }
        _ => ChatClient::new(&cfg.url),
    };

    if let Some(username) = &cfg.username {
        debug!(user = %username, "credentials configured, logging in first");
        client
            .login(username, cfg.password.as_deref().unwrap_or_default())
            .await?;
    }

    client.post_message(&payload).await?;

    info!(
        status = %ctx.build.status,
        repo = %format!("{}/{}", ctx.repo.owner, ctx.repo.name),
        "notification delivered"
    );
    Ok(())
}
