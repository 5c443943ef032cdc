use serde::{Deserialize, Serialize};

/// A calendar as seen by the rest of the app: the server's presentation
/// fields merged with the locally stored visibility preference.
///
/// `visible` is the only field whose stored value survives a fetch; every
/// other field is overwritten from the server payload each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub title: String,
    pub description: String,
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
    /// Whether the user may write to this calendar (accessRole is
    /// `writer` or `owner`).
    pub editable: bool,
    /// User preference; defaults from the server's selected/hidden flags
    /// on first sight, sticky to local storage afterwards.
    pub visible: bool,
}
