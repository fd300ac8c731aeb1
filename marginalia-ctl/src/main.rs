use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use marginalia_client::{
    api::{CommentId, Target},
    CommentModel, CommentRegistry, Config, DocumentPath, FsStore, IdentityProvider, ModelManager,
    NewComment, SessionIdentity, StaticAwareness, TargetSource,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Directory the document paths are relative to
    #[structopt(short, long, env = "MARGINALIA_ROOT", default_value = ".")]
    root: PathBuf,

    /// Name to sign new comments and replies with
    #[structopt(long, env = "MARGINALIA_USER")]
    name: Option<String>,

    /// Color to display the author with
    #[structopt(long)]
    color: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Create the comments directory
    Init,

    /// Print the path of the comment file of a document
    Path { document: String },

    /// List the comments of a document
    List { document: String },

    /// Comment on a document
    Add {
        document: String,
        text: String,

        /// Comment type
        #[structopt(long, default_value = "document")]
        kind: String,

        /// Target descriptor, as JSON
        #[structopt(long)]
        target: Option<String>,
    },

    /// Reply to a comment
    Reply {
        document: String,
        parent: String,
        text: String,
    },

    /// Delete a comment and its replies
    Delete { document: String, id: String },

    /// Delete a reply
    DeleteReply {
        document: String,
        parent: String,
        reply: String,
    },
}

fn identity(opt: &Opt) -> SessionIdentity {
    let mut user = serde_json::Map::new();
    if let Some(name) = &opt.name {
        user.insert(String::from("name"), name.clone().into());
    }
    if let Some(color) = &opt.color {
        user.insert(String::from("color"), color.clone().into());
    }
    let state = serde_json::json!({ "user": user });
    SessionIdentity::new(Arc::new(StaticAwareness(Some(state))))
}

async fn load(manager: &mut ModelManager, document: &str) -> anyhow::Result<CommentModel> {
    let document = DocumentPath::new(document);
    manager
        .load_model(&document)
        .await
        .with_context(|| format!("loading comments of {document}"))
}

fn print_model(model: &CommentModel) {
    for c in model.comments() {
        println!("{} [{}] {} ({}): {}", c.id, c.kind, c.identity.name, c.time, c.text);
        for r in c.replies {
            println!("  {} {} ({}): {}", r.id, r.identity.name, r.time, r.text);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let identity = identity(&opt);
    let mut manager = ModelManager::new(
        Arc::new(FsStore::new(opt.root.clone())),
        Arc::new(CommentRegistry::with_defaults()),
        Config::from_env(),
    );

    match opt.cmd {
        Command::Init => {
            manager.init().await.context("initializing comments directory")?;
        }
        Command::Path { document } => {
            println!("{}", manager.comment_path(&DocumentPath::new(&document)));
        }
        Command::List { document } => {
            let model = load(&mut manager, &document).await?;
            print_model(&model);
        }
        Command::Add {
            document,
            text,
            kind,
            target,
        } => {
            let target = match target {
                Some(t) => serde_json::from_str(&t).context("parsing target descriptor")?,
                None => Target::Null,
            };
            let model = load(&mut manager, &document).await?;
            let comment = model
                .add_comment(NewComment {
                    kind,
                    text,
                    identity: identity.identity(),
                    source: TargetSource::Target(target),
                })
                .context("adding comment")?;
            manager.save(&model.document()).await?;
            println!("{}", comment.id);
        }
        Command::Reply {
            document,
            parent,
            text,
        } => {
            let model = load(&mut manager, &document).await?;
            let reply = model
                .reply(&CommentId(parent.clone()), text, identity.identity())
                .with_context(|| format!("replying to comment {parent}"))?;
            manager.save(&model.document()).await?;
            println!("{}", reply.id);
        }
        Command::Delete { document, id } => {
            let model = load(&mut manager, &document).await?;
            if !model.delete_comment(&CommentId(id.clone())) {
                anyhow::bail!("no comment {id} on {document}");
            }
            manager.save(&model.document()).await?;
        }
        Command::DeleteReply {
            document,
            parent,
            reply,
        } => {
            let model = load(&mut manager, &document).await?;
            if !model.delete_reply(&CommentId(parent.clone()), &CommentId(reply.clone())) {
                anyhow::bail!("no reply {reply} to comment {parent} on {document}");
            }
            manager.save(&model.document()).await?;
        }
    }

    Ok(())
}
