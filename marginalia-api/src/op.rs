use uuid::Uuid;

use crate::{Comment, CommentId, Error, Reply};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ReplicaId(pub Uuid);

impl ReplicaId {
    pub fn new() -> ReplicaId {
        ReplicaId(Uuid::new_v4())
    }
}

impl Default for ReplicaId {
    fn default() -> ReplicaId {
        ReplicaId::new()
    }
}

/// Total order over all ops of all replicas: lamport clock first, replica id
/// to break ties between concurrent ops
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct OpId {
    pub lamport: u64,
    pub replica: ReplicaId,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Op {
    pub id: OpId,
    pub data: OpData,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum OpData {
    AddComment(Comment),
    AddReply {
        parent: CommentId,
        reply: Reply,
    },
    DeleteComment(CommentId),
    DeleteReply {
        parent: CommentId,
        reply: CommentId,
    },
    EditComment {
        id: CommentId,
        text: String,
    },
    EditReply {
        parent: CommentId,
        reply: CommentId,
        text: String,
    },
}

impl Op {
    // See comments on `validate_string`
    pub fn validate(&self) -> Result<(), Error> {
        self.data.validate()
    }
}

impl OpData {
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            OpData::AddComment(c) => {
                if !c.replies.is_empty() {
                    return Err(Error::InvalidOp(String::from(
                        "comments must be added without replies",
                    )));
                }
                c.validate()
            }
            OpData::AddReply { parent: _, reply } => reply.validate(),
            OpData::DeleteComment(_) => Ok(()),
            OpData::DeleteReply {
                parent: _,
                reply: _,
            } => Ok(()),
            OpData::EditComment { id: _, text } => crate::validate_string(text),
            OpData::EditReply {
                parent: _,
                reply: _,
                text,
            } => crate::validate_string(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_ids_order_by_clock_then_replica() {
        let a = ReplicaId(Uuid::from_u128(1));
        let b = ReplicaId(Uuid::from_u128(2));
        let id = |lamport, replica| OpId { lamport, replica };
        assert!(id(1, b) < id(2, a));
        assert!(id(3, a) < id(3, b));
        assert_eq!(id(3, a), id(3, a));
    }

    #[test]
    fn adding_a_comment_with_replies_is_invalid() {
        let mut c = Comment::new(
            "document",
            serde_json::Value::Null,
            String::from("x"),
            crate::Identity::stub(),
        );
        assert!(OpData::AddComment(c.clone()).validate().is_ok());
        c.replies.push(Reply::new(
            "document",
            String::from("y"),
            crate::Identity::stub(),
        ));
        assert!(OpData::AddComment(c).validate().is_err());
    }
}
