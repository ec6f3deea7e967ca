use handlebars::Handlebars;

use crate::context::BuildContext;
use crate::error::NotificationError;

/// How the attachment text is produced: a user-supplied template, or the
/// built-in one-line summary. Resolved once from config before the payload
/// is constructed.
#[derive(Debug, Clone)]
pub enum MessageText {
    Template(String),
    Default,
}

impl MessageText {
    pub fn resolve(template: Option<&str>) -> Self {
        match template {
            Some(t) if !t.is_empty() => Self::Template(t.to_string()),
            _ => Self::Default,
        }
    }

    /// Render the message text against the build context. Template errors
    /// surface to the caller; they are never silently replaced with the
    /// default text.
    pub fn render(&self, ctx: &BuildContext) -> Result<String, NotificationError> {
        match self {
            Self::Template(tpl) => {
                let hb = Handlebars::new();
                let rendered = hb.render_template(tpl, ctx)?;
                Ok(rendered.trim().to_string())
            }
            Self::Default => Ok(default_text(ctx)),
        }
    }
}

/// Built-in summary line: `<status> <owner>/<name>#<sha8> (<branch>) by <author>`.
fn default_text(ctx: &BuildContext) -> String {
    format!(
        "{} {}/{}#{} ({}) by {}",
        ctx.build.status,
        ctx.repo.owner,
        ctx.repo.name,
        short_sha(&ctx.commit.sha),
        ctx.commit.branch,
        ctx.commit.author.name,
    )
}

/// First 8 characters of the sha, clamped so a short sha is used whole.
fn short_sha(sha: &str) -> &str {
    let end = sha
        .char_indices()
        .nth(8)
        .map_or(sha.len(), |(idx, _)| idx);
    &sha[..end]
}

/// Attachment color bar for a build status. Total mapping; anything the CI
/// system invents beyond the known statuses lands on "warning".
pub fn color(status: &str) -> &'static str {
    match status {
        "success" => "good",
        "failure" | "error" | "killed" => "danger",
        _ => "warning",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample_ctx() -> BuildContext {
        let mut ctx = BuildContext::default();
        ctx.repo.owner = "acme".to_string();
        ctx.repo.name = "app".to_string();
        ctx.build.status = "success".to_string();
        ctx.commit.sha = "abcdef1234567".to_string();
        ctx.commit.branch = "main".to_string();
        ctx.commit.author.name = "alice".to_string();
        ctx
    }

    #[test]
    fn color_known_statuses() {
        assert_eq!(color("success"), "good");
        assert_eq!(color("failure"), "danger");
        assert_eq!(color("error"), "danger");
        assert_eq!(color("killed"), "danger");
    }

    #[test]
    fn color_defaults_to_warning() {
        for status in ["pending", "running", "skipped", "blocked", ""] {
            assert_eq!(color(status), "warning");
        }
    }

    #[test]
    fn default_text_fields() {
        let text = MessageText::Default.render(&sample_ctx()).unwrap();
        assert!(text.contains("success"));
        assert!(text.contains("acme/app#abcdef12"));
        assert!(text.contains("(main)"));
        assert!(text.contains("by alice"));
    }

    #[test]
    fn short_sha_clamps() {
        assert_eq!(short_sha("abcdef1234567"), "abcdef12");
        assert_eq!(short_sha("abc"), "abc");
        assert_eq!(short_sha(""), "");
    }

    #[test]
    fn template_replaces_default() {
        let msg = MessageText::resolve(Some(
            "build {{build.status}} on {{commit.branch}} by {{commit.author.name}}",
        ));
        let text = msg.render(&sample_ctx()).unwrap();
        assert_eq!(text, "build success on main by alice");
    }

    #[test]
    fn empty_template_falls_back_to_default() {
        assert_matches!(MessageText::resolve(Some("")), MessageText::Default);
        assert_matches!(MessageText::resolve(None), MessageText::Default);
    }

    #[test]
    fn invalid_template_errors() {
        let msg = MessageText::resolve(Some("{{#if}}broken"));
        let err = msg.render(&sample_ctx()).unwrap_err();
        assert_matches!(err, NotificationError::TemplateRender(_));
    }

    #[test]
    fn template_output_is_trimmed() {
        let msg = MessageText::resolve(Some("  {{build.status}}  \n"));
        assert_eq!(msg.render(&sample_ctx()).unwrap(), "success");
    }
}
