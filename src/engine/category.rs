use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Category {
    Code,
    Meetings,
    Explore,
    Productivity,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Code => "Code",
            Category::Meetings => "Meetings",
            Category::Explore => "Explore",
            Category::Productivity => "Productivity",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyword table, checked top to bottom. The first category with a keyword contained in the
/// lower-cased app name wins. Keywords must be lower case.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Code,
        &[
            "code", "studio", "intellij", "pycharm", "webstorm", "clion", "goland", "rustrover",
            "xcode", "cursor", "vim", "emacs", "sublime", "terminal", "iterm", "alacritty",
            "kitty", "wezterm", "konsole", "github desktop", "gitkraken",
        ],
    ),
    (
        Category::Meetings,
        &[
            "zoom", "teams", "meet", "slack", "discord", "skype", "webex", "facetime",
        ],
    ),
    (
        Category::Explore,
        &[
            "chrome", "chromium", "firefox", "safari", "microsoft edge", "brave", "opera", "vivaldi",
            "browser",
        ],
    ),
    (
        Category::Productivity,
        &[
            "notion", "obsidian", "microsoft word", "excel", "powerpoint", "keynote", "docs", "sheets",
            "calendar", "notes", "todoist", "figma", "outlook", "mail", "libreoffice",
        ],
    ),
];

pub fn categorize(app_name: &str) -> Category {
    let name = app_name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map_or(Category::Other, |(category, _)| *category)
}

#[cfg(test)]
mod tests {
    use super::{categorize, Category, CATEGORY_KEYWORDS};

    #[test]
    fn test_categorize_known_apps() {
        assert_eq!(categorize("Visual Studio Code"), Category::Code);
        assert_eq!(categorize("zoom.us"), Category::Meetings);
        assert_eq!(categorize("Google Chrome"), Category::Explore);
        assert_eq!(categorize("Notion"), Category::Productivity);
        assert_eq!(categorize("unknownapp"), Category::Other);
        assert_eq!(categorize(""), Category::Other);
    }

    #[test]
    fn test_categorize_is_case_insensitive() {
        assert_eq!(categorize("FIREFOX"), Category::Explore);
        assert_eq!(categorize("/usr/bin/NVIM"), Category::Code);
    }

    #[test]
    fn test_categorize_priority() {
        // Matches both "code" and "meet", the earlier category wins.
        assert_eq!(categorize("Meet Code Review"), Category::Code);
        // Matches both "teams" and "microsoft edge".
        assert_eq!(categorize("Teams in Microsoft Edge"), Category::Meetings);
    }

    #[test]
    fn test_keywords_do_not_match_inside_words() {
        assert_eq!(categorize("Digital Color Meter"), Category::Other);
        assert_eq!(categorize("Knowledge Base"), Category::Other);
        assert_eq!(categorize("1Password"), Category::Other);
        assert_eq!(categorize("Authorized Apps"), Category::Other);
        assert_eq!(categorize("Microsoft Word"), Category::Productivity);
        assert_eq!(categorize("Microsoft Edge"), Category::Explore);
        assert_eq!(categorize("GitHub Desktop"), Category::Code);
    }

    #[test]
    fn test_keywords_are_lowercase() {
        for (_, keywords) in CATEGORY_KEYWORDS {
            for keyword in keywords.iter() {
                assert_eq!(keyword.to_lowercase(), *keyword);
            }
        }
    }
}
