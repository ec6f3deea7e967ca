use serde::Serialize;

/// Snapshot of repository metadata for the build being reported.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Repo {
    pub owner: String,
    pub name: String,
    pub link: String,
    pub avatar: String,
    pub branch: String,
    pub private: bool,
}

/// Snapshot of the pipeline run itself.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Build {
    pub number: i64,
    pub event: String,
    pub status: String,
    pub deploy: String,
    pub created: i64,
    pub started: i64,
    pub finished: i64,
    pub link: String,
}

/// Snapshot of the commit that triggered the build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Commit {
    pub remote: String,
    pub sha: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub link: String,
    pub pull: String,
    pub branch: String,
    pub message: String,
    pub author: Author,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub avatar: String,
}

/// Immutable snapshot of everything the notifier may reference: populated
/// once from the CI environment, read-only afterwards. Serializable so
/// custom templates can address any field (`{{build.status}}`,
/// `{{commit.author.name}}`, ...).
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildContext {
    pub repo: Repo,
    pub build: Build,
    pub commit: Commit,
}

impl BuildContext {
    /// Materialize the context from `CI_*` environment variables. Missing
    /// string variables default to empty, numeric ones to zero, so a partial
    /// CI environment still produces a sendable (if sparse) message.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the context through an injectable lookup, so tests don't have
    /// to mutate process-global environment state.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();
        let num = |key: &str| {
            lookup(key)
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or_default()
        };

        Self {
            repo: Repo {
                owner: var("CI_REPO_OWNER"),
                name: var("CI_REPO_NAME"),
                link: var("CI_REPO_LINK"),
                avatar: var("CI_REPO_AVATAR"),
                branch: var("CI_REPO_BRANCH"),
                private: lookup("CI_REPO_PRIVATE")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false),
            },
            build: Build {
                number: num("CI_BUILD_NUMBER"),
                event: var("CI_BUILD_EVENT"),
                status: var("CI_BUILD_STATUS"),
                deploy: var("CI_DEPLOY_TO"),
                created: num("CI_BUILD_CREATED"),
                started: num("CI_BUILD_STARTED"),
                finished: num("CI_BUILD_FINISHED"),
                link: var("CI_BUILD_LINK"),
            },
            commit: Commit {
                remote: var("CI_REMOTE_URL"),
                sha: var("CI_COMMIT_SHA"),
                git_ref: var("CI_COMMIT_REF"),
                link: var("CI_COMMIT_LINK"),
                pull: var("CI_PULL_REQUEST"),
                branch: var("CI_COMMIT_BRANCH"),
                message: var("CI_COMMIT_MESSAGE"),
                author: Author {
                    name: var("CI_COMMIT_AUTHOR"),
                    email: var("CI_COMMIT_AUTHOR_EMAIL"),
                    avatar: var("CI_COMMIT_AUTHOR_AVATAR"),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("CI_REPO_OWNER", "acme"),
            ("CI_REPO_NAME", "app"),
            ("CI_BUILD_NUMBER", "42"),
            ("CI_BUILD_STATUS", "success"),
            ("CI_COMMIT_SHA", "abcdef1234567"),
            ("CI_COMMIT_BRANCH", "main"),
            ("CI_COMMIT_AUTHOR", "alice"),
            ("CI_REPO_PRIVATE", "true"),
        ])
    }

    #[test]
    fn context_from_lookup() {
        let env = sample_env();
        let ctx = BuildContext::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(ctx.repo.owner, "acme");
        assert_eq!(ctx.repo.name, "app");
        assert!(ctx.repo.private);
        assert_eq!(ctx.build.number, 42);
        assert_eq!(ctx.build.status, "success");
        assert_eq!(ctx.commit.sha, "abcdef1234567");
        assert_eq!(ctx.commit.author.name, "alice");
    }

    #[test]
    fn missing_vars_default() {
        let ctx = BuildContext::from_lookup(|_| None);
        assert_eq!(ctx.repo.owner, "");
        assert_eq!(ctx.build.number, 0);
        assert!(!ctx.repo.private);
    }

    #[test]
    fn template_fields_serialize_with_ref_rename() {
        let mut ctx = BuildContext::default();
        ctx.commit.git_ref = "refs/heads/main".to_string();
        let v = serde_json::to_value(&ctx).unwrap();
        assert_eq!(v["commit"]["ref"], "refs/heads/main");
    }
}
