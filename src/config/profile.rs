use serde::{Deserialize, Serialize};

/// A named selection of components plus loose packages.
///
/// Hooks are descriptive labels only; nothing executes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub components: Vec<String>,
    /// Extra packages installed directly with the native package manager.
    #[serde(default)]
    pub apps: Vec<String>,
    #[serde(default)]
    pub hooks: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn profile(name: &str, description: &str, components: &[&str], apps: &[&str], hooks: &[&str]) -> Profile {
    Profile {
        name: name.to_string(),
        description: description.to_string(),
        components: strings(components),
        apps: strings(apps),
        hooks: strings(hooks),
    }
}

pub fn builtin_profiles() -> Vec<Profile> {
    vec![
        profile(
            "Default",
            "Safe defaults for general use",
            &["core", "devtools"],
            &[],
            &["git-config"],
        ),
        profile(
            "Developer",
            "Full-stack development environment",
            &["core", "devtools", "network"],
            &["docker", "gh"],
            &["git-config", "code-extensions"],
        ),
        profile(
            "Cybersecurity",
            "Penetration testing and security tools",
            &["core", "security-research", "network", "forensics"],
            &[],
            &[],
        ),
        profile(
            "Privacy",
            "Anonymity and encryption tooling",
            &["core", "privacy"],
            &[],
            &[],
        ),
        profile(
            "Minimal",
            "Essential CLI tools only",
            &[],
            &["git", "fzf", "ripgrep", "bat", "eza"],
            &[],
        ),
    ]
}

/// File name a profile is stored under, e.g. `AI/ML` -> `ai-ml.json`.
pub(crate) fn file_name(name: &str) -> String {
    format!("{}.json", name.to_lowercase().replace(['/', ' '], "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components;

    #[test]
    fn test_builtin_components_exist() {
        for profile in builtin_profiles() {
            for id in &profile.components {
                assert!(components::find(id).is_ok(), "{} -> {id}", profile.name);
            }
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("Default"), "default.json");
        assert_eq!(file_name("AI/ML"), "ai-ml.json");
        assert_eq!(file_name("Red Team"), "red-team.json");
    }
}
