use std::fmt;

/// One unit of work handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A whole profile/channel; the engine expands it into items.
    Collection(String),
    /// A single media item URL.
    Item(String),
}

impl Target {
    pub fn reference(&self) -> &str {
        match self {
            Target::Collection(reference) | Target::Item(reference) => reference,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Target::Collection(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Collection(reference) => write!(f, "collection {reference}"),
            Target::Item(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no targets: enter a profile/collection reference or at least one item URL")]
pub struct NoTargetsError;

/// Build the ordered target list: the collection (if any) first, then items
/// in the order given. Whitespace is trimmed and blank entries dropped.
/// Duplicates are kept.
pub fn resolve<S: AsRef<str>>(
    collection_ref: Option<&str>,
    item_refs: &[S],
) -> Result<Vec<Target>, NoTargetsError> {
    let collection = collection_ref
        .map(str::trim)
        .filter(|reference| !reference.is_empty())
        .map(|reference| Target::Collection(reference.to_string()));

    let items = item_refs
        .iter()
        .map(|raw| raw.as_ref().trim())
        .filter(|url| !url.is_empty())
        .map(|url| Target::Item(url.to_string()));

    let targets: Vec<Target> = collection.into_iter().chain(items).collect();
    if targets.is_empty() {
        return Err(NoTargetsError);
    }
    Ok(targets)
}

/// Split free-text input (one URL per line) into trimmed, non-blank refs.
pub fn parse_item_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
