//! Path-prefix target selection.
//!
//! Every inbound path maps to exactly one of two backends: paths
//! beginning with [`AUTH_PREFIX`] go to the auth backend, everything else
//! to the main backend. The comparison is a plain string prefix on the
//! raw path-and-query, so `/authorize` and `/auth?next=/` are auth paths
//! while `/api/auth` is not.

use crate::config::model::Backends;

pub const AUTH_PREFIX: &str = "/auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Main,
    Auth,
}

impl Target {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Auth => "auth",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[must_use]
pub fn select_target(path: &str) -> Target {
    if path.starts_with(AUTH_PREFIX) {
        Target::Auth
    } else {
        Target::Main
    }
}

/// The two backend base URLs, resolved once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBases {
    main: String,
    auth: String,
}

impl TargetBases {
    /// Bases are used verbatim; a trailing slash is trimmed so that
    /// appending a path never doubles it.
    #[must_use]
    pub fn new(main: impl Into<String>, auth: impl Into<String>) -> Self {
        let trim = |s: String| s.trim_end_matches('/').to_string();
        Self {
            main: trim(main.into()),
            auth: trim(auth.into()),
        }
    }

    #[must_use]
    pub fn from_backends(backends: &Backends) -> Self {
        Self::new(backends.main.base_url(), backends.auth.base_url())
    }

    #[must_use]
    pub fn base(&self, target: Target) -> &str {
        match target {
            Target::Main => &self.main,
            Target::Auth => &self.auth,
        }
    }

    /// Select the target for `path_and_query` and build the full outbound URL.
    #[must_use]
    pub fn url_for(&self, path_and_query: &str) -> (Target, String) {
        let target = select_target(path_and_query);
        (target, format!("{}{path_and_query}", self.base(target)))
    }
}
