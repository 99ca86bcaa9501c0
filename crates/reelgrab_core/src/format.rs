use std::fmt;
use std::str::FromStr;

/// Output quality chosen by the user for a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualitySelection {
    #[default]
    Best,
    Max1080p,
    Max720p,
    Mp4Only,
}

impl QualitySelection {
    pub const ALL: [QualitySelection; 4] = [
        QualitySelection::Best,
        QualitySelection::Max1080p,
        QualitySelection::Max720p,
        QualitySelection::Mp4Only,
    ];

    /// Human label, as shown in the quality picker.
    pub fn label(self) -> &'static str {
        match self {
            QualitySelection::Best => "Best (auto)",
            QualitySelection::Max1080p => "Max 1080p",
            QualitySelection::Max720p => "Max 720p",
            QualitySelection::Mp4Only => "MP4 only",
        }
    }
}

impl fmt::Display for QualitySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown quality {0:?} (expected best, 1080p, 720p or mp4)")]
pub struct UnknownQuality(pub String);

impl FromStr for QualitySelection {
    type Err = UnknownQuality;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "best" | "best(auto)" | "auto" => Ok(QualitySelection::Best),
            "1080p" | "1080" | "max1080p" => Ok(QualitySelection::Max1080p),
            "720p" | "720" | "max720p" => Ok(QualitySelection::Max720p),
            "mp4" | "mp4only" => Ok(QualitySelection::Mp4Only),
            _ => Err(UnknownQuality(raw.to_string())),
        }
    }
}

/// Engine-specific stream selector with `/`-separated fallback tiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormatExpression(String);

impl FormatExpression {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fallback tiers in the order the engine evaluates them.
    pub fn tiers(&self) -> Vec<&str> {
        self.0.split('/').collect()
    }
}

impl fmt::Display for FormatExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pure mapping from a quality selection to its format expression.
pub fn selector(quality: QualitySelection) -> FormatExpression {
    let expr = match quality {
        QualitySelection::Best => "bestvideo*+bestaudio/best",
        QualitySelection::Max1080p => "bv*[height<=1080]+ba/b[height<=1080]",
        QualitySelection::Max720p => "bv*[height<=720]+ba/b[height<=720]",
        // Tier order matters: split mp4/m4a, then combined mp4, then anything.
        QualitySelection::Mp4Only => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
    };
    FormatExpression(expr.to_string())
}
