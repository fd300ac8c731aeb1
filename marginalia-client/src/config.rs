use crate::document::DocumentPath;

pub const COMMENTS_DIR_VAR: &str = "MARGINALIA_COMMENTS_DIR";
pub const EXTENSION_VAR: &str = "MARGINALIA_COMMENT_EXTENSION";

/// Where comment files live relative to the documents they annotate
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    pub comments_dir: String,
    pub extension: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            comments_dir: String::from(".comments"),
            extension: String::from("comment"),
        }
    }
}

impl Config {
    /// Defaults, overridden by the environment variables when set
    pub fn from_env() -> Config {
        let mut config = Config::default();
        if let Ok(dir) = std::env::var(COMMENTS_DIR_VAR) {
            config.comments_dir = dir;
        }
        if let Ok(ext) = std::env::var(EXTENSION_VAR) {
            config.extension = ext;
        }
        config
    }

    /// `<comments_dir>/<parent dirs>/<stem>.<extension>`
    ///
    /// Documents differing only by their extension share a comment file.
    pub fn comment_path(&self, document: &DocumentPath) -> String {
        let dir = self.comments_dir.trim_end_matches('/');
        let mut path = String::from(dir);
        if let Some(parent) = document.parent() {
            path.push('/');
            path.push_str(parent);
        }
        path.push('/');
        path.push_str(document.stem());
        path.push('.');
        path.push_str(&self.extension);
        path
    }
}
