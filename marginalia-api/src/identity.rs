#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Identity {
    pub name: String,

    /// CSS color, eg. `#1f77b4` or `var(--jp-collaborator-color1)`
    pub color: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Identity {
        Identity {
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn stub() -> Identity {
        Identity::new("Anonymous", "#808080")
    }
}
