#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the profile/collection reference field.
    CollectionRefChanged(String),
    /// User edited the multi-line item URL box.
    ItemsChanged(String),
    /// User picked a destination folder.
    OutputDirChanged(String),
    QualityChanged(crate::QualitySelection),
    /// `0` = unlimited.
    MaxItemsChanged(u32),
    ArchiveToggled(bool),
    ArchivePathChanged(String),
    CredentialFileChanged(String),
    /// User clicked Start.
    StartClicked,
    /// User clicked Cancel (or pressed Ctrl-C).
    CancelClicked,
    /// The batch could not start (e.g. output directory not creatable).
    StartFailed(String),
    /// Event drained from the progress channel.
    Progress(crate::ProgressEvent),
}
