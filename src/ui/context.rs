//! Interactive vs plain output detection

use std::io::IsTerminal;
use tracing::debug;

/// Environment variables set by CI runners
const CI_VARS: [&str; 9] = [
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// Forces plain output even on a terminal
const PLAIN_VAR: &str = "ENTITLE_PLAIN";

/// How one command invocation talks to the user
#[derive(Debug, Clone)]
pub struct UiContext {
    /// cliclack prompts and log lines are allowed
    fancy: bool,
    /// `--yes`: approve prompts without asking
    auto_yes: bool,
}

impl UiContext {
    /// Inspect the terminal and environment
    pub fn detect() -> Self {
        let fancy = match plain_reason() {
            Some(reason) => {
                debug!(reason, "Using plain output");
                false
            }
            None => true,
        };
        Self {
            fancy,
            auto_yes: false,
        }
    }

    /// Plain output, no prompting
    pub fn non_interactive() -> Self {
        Self {
            fancy: false,
            auto_yes: false,
        }
    }

    pub fn with_auto_yes(self, auto_yes: bool) -> Self {
        Self { auto_yes, ..self }
    }

    /// A user can answer prompts
    pub fn is_interactive(&self) -> bool {
        self.fancy
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    pub fn use_fancy_output(&self) -> bool {
        self.fancy
    }
}

/// Why output must stay plain, if it must
fn plain_reason() -> Option<&'static str> {
    if !std::io::stdout().is_terminal() {
        return Some("stdout is not a terminal");
    }
    if !std::io::stdin().is_terminal() {
        return Some("stdin is not a terminal");
    }
    if std::env::var_os(PLAIN_VAR).is_some() {
        return Some("ENTITLE_PLAIN is set");
    }
    CI_VARS
        .iter()
        .find(|var| std::env::var_os(var).is_some())
        .map(|_| "running under CI")
}
