use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── TIERS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty tier: {0}")]
pub struct TierParseError(pub String);

/// Difficulty tier of a dictionary leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    /// All tiers in presentation order.
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Medium => "Medium",
            Tier::Hard => "Hard",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TierParseError(trimmed.to_owned()))
    }
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// The two families of content the repository serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Collections of words, split by difficulty tier.
    Dictionary,
    /// Grammar categories without tiers.
    Grammar,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Dictionary => f.write_str("dictionary"),
            ContentKind::Grammar => f.write_str("grammar"),
        }
    }
}

/// A fully or partially resolved choice of what to quiz on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentSelection {
    Dictionary { name: String, tier: Tier },
    Grammar { name: String },
    /// Every dictionary leaf followed by every grammar category.
    RandomPool,
}

impl ContentSelection {
    #[must_use]
    pub fn dictionary(name: impl Into<String>, tier: Tier) -> Self {
        Self::Dictionary {
            name: name.into(),
            tier,
        }
    }

    #[must_use]
    pub fn grammar(name: impl Into<String>) -> Self {
        Self::Grammar { name: name.into() }
    }

    #[must_use]
    pub fn kind(&self) -> Option<ContentKind> {
        match self {
            Self::Dictionary { .. } => Some(ContentKind::Dictionary),
            Self::Grammar { .. } => Some(ContentKind::Grammar),
            Self::RandomPool => None,
        }
    }

    #[must_use]
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Dictionary { tier, .. } => Some(*tier),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Dictionary { name, .. } | Self::Grammar { name } => Some(name),
            Self::RandomPool => None,
        }
    }
}

impl fmt::Display for ContentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dictionary { name, tier } => write!(f, "'{name}' ({tier})"),
            Self::Grammar { name } => write!(f, "'{name}' grammar"),
            Self::RandomPool => f.write_str("random questions"),
        }
    }
}

/// One prompt with the answer expected for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuestionPair {
    pub prompt: String,
    pub answer: String,
}

impl QuestionPair {
    #[must_use]
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }
}

impl<P: Into<String>, A: Into<String>> From<(P, A)> for QuestionPair {
    fn from((prompt, answer): (P, A)) -> Self {
        Self::new(prompt, answer)
    }
}
