pub use uuid::Uuid;

mod comment;
pub use comment::{Comment, CommentId, Reply, Target};

mod error;
pub use error::Error;

mod file;
pub use file::{CommentFile, CURRENT_VERSION};

mod identity;
pub use identity::Identity;

mod op;
pub use op::{Op, OpData, OpId, ReplicaId};

/// Format used for the human-readable `time` field of comments and replies
pub const TIME_FORMAT: &str = "%b %-d %Y, %H:%M";

pub fn now_string() -> String {
    chrono::Utc::now().format(TIME_FORMAT).to_string()
}

// Comment bodies end up in JSON files read by other tools, some of which choke
// on embedded null bytes
pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}
