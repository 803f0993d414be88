//! Terminal capability detection

use std::io::IsTerminal;

/// Variables whose presence marks a CI run
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Forces plain output even on a terminal
const PLAIN_VAR: &str = "PROXIMA_PLAIN";

/// How output and prompts should behave for this process
#[derive(Debug, Clone)]
pub struct UiContext {
    fancy: bool,
    interactive: bool,
    auto_yes: bool,
}

impl UiContext {
    /// Inspect stdio and the environment
    pub fn detect() -> Self {
        let automated = CI_VARS
            .iter()
            .chain(std::iter::once(&PLAIN_VAR))
            .any(|var| std::env::var_os(var).is_some());
        let fancy = !automated && std::io::stdout().is_terminal();

        Self {
            fancy,
            interactive: fancy && std::io::stdin().is_terminal(),
            auto_yes: false,
        }
    }

    /// Plain output, no prompts
    pub fn non_interactive() -> Self {
        Self {
            fancy: false,
            interactive: false,
            auto_yes: false,
        }
    }

    /// Approve every confirmation without asking
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    /// Whether prompts can be shown
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Whether styled cliclack output is appropriate
    pub fn use_fancy_output(&self) -> bool {
        self.fancy
    }
}
