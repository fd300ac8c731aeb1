use crate::{Comment, Error};

pub const CURRENT_VERSION: u32 = 1;

fn default_version() -> u32 {
    // files written before versioning was introduced
    1
}

/// On-disk contents of a comment file, one per commented document
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentFile {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Default for CommentFile {
    fn default() -> CommentFile {
        CommentFile {
            version: CURRENT_VERSION,
            comments: Vec::new(),
        }
    }
}

impl CommentFile {
    pub fn new(comments: Vec<Comment>) -> CommentFile {
        CommentFile {
            version: CURRENT_VERSION,
            comments,
        }
    }

    pub fn parse(contents: &str) -> Result<CommentFile, Error> {
        // An empty file is what gets left behind by hosts that create the
        // comment file before having anything to put in it
        if contents.trim().is_empty() {
            return Ok(CommentFile::default());
        }
        let file: CommentFile = serde_json::from_str(contents)
            .map_err(|e| Error::InvalidFile(e.to_string()))?;
        if file.version != CURRENT_VERSION {
            return Err(Error::UnsupportedVersion(file.version));
        }
        Ok(file)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("serializing comment file")
    }
}
