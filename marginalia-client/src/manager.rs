use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use tokio::sync::mpsc;

use crate::{
    api::{CommentFile, ReplicaId},
    config::Config,
    document::DocumentPath,
    model::{Change, CommentModel},
    registry::CommentRegistry,
    store::Store,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Binding {
    Unbound,
    Bound,
}

/// Sent to listeners when the current model changes. `None` means no
/// document is current anymore.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModelChanged {
    pub document: Option<DocumentPath>,
}

#[derive(Debug)]
struct Current {
    document: DocumentPath,
    changes: mpsc::UnboundedReceiver<Change>,
}

/// Binds one comment model to each open document and tracks which one is
/// current.
///
/// Models are keyed by comment file: documents whose comment paths collide
/// share a single model, so saving one never overwrites the comments of the
/// other.
pub struct ModelManager {
    store: Arc<dyn Store>,
    registry: Arc<CommentRegistry>,
    replica: ReplicaId,
    config: Config,
    models: HashMap<String, CommentModel>,
    documents: HashMap<DocumentPath, String>,
    current: Option<Current>,
    listeners: Vec<mpsc::UnboundedSender<ModelChanged>>,
}

impl ModelManager {
    pub fn new(store: Arc<dyn Store>, registry: Arc<CommentRegistry>, config: Config) -> ModelManager {
        ModelManager {
            store,
            registry,
            replica: ReplicaId::new(),
            config,
            models: HashMap::new(),
            documents: HashMap::new(),
            current: None,
            listeners: Vec::new(),
        }
    }

    pub fn with_replica(mut self, replica: ReplicaId) -> ModelManager {
        self.replica = replica;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CommentRegistry> {
        &self.registry
    }

    pub fn replica(&self) -> ReplicaId {
        self.replica
    }

    pub fn comment_path(&self, document: &DocumentPath) -> String {
        self.config.comment_path(document)
    }

    pub async fn path_exists(&self, path: &str) -> anyhow::Result<bool> {
        self.store.exists(path).await
    }

    /// Makes sure the comments directory exists
    pub async fn init(&self) -> anyhow::Result<()> {
        let dir = &self.config.comments_dir;
        if !self
            .path_exists(dir)
            .await
            .with_context(|| format!("checking for comments directory {dir:?}"))?
        {
            tracing::info!(%dir, "creating comments directory");
            self.store
                .create_dir(dir)
                .await
                .with_context(|| format!("creating comments directory {dir:?}"))?;
        }
        Ok(())
    }

    pub fn current(&self) -> Option<CommentModel> {
        self.get(&self.current.as_ref()?.document)
    }

    pub fn current_document(&self) -> Option<&DocumentPath> {
        self.current.as_ref().map(|c| &c.document)
    }

    pub fn get(&self, document: &DocumentPath) -> Option<CommentModel> {
        let path = self.documents.get(document)?;
        self.models.get(path).cloned()
    }

    pub fn binding(&self, document: &DocumentPath) -> Binding {
        match self.documents.contains_key(document) {
            true => Binding::Bound,
            false => Binding::Unbound,
        }
    }

    pub fn live_documents(&self) -> Vec<DocumentPath> {
        let mut docs = self.documents.keys().cloned().collect::<Vec<_>>();
        docs.sort_unstable();
        docs
    }

    /// Returns the model bound to `document`, loading it from its comment
    /// file if it is not bound yet, and makes it current.
    ///
    /// The comment file is created empty if it does not exist yet. Store
    /// failures are returned as is, leaving the document unbound.
    pub async fn load_model(&mut self, document: &DocumentPath) -> anyhow::Result<CommentModel> {
        if let Some(model) = self.get(document) {
            self.set_current(document);
            return Ok(model);
        }

        let path = self.comment_path(document);
        if let Some(model) = self.models.get(&path).cloned() {
            tracing::debug!(%document, %path, "document shares an already-loaded comment file");
            model.share_with(document);
            self.documents.insert(document.clone(), path);
            self.set_current(document);
            return Ok(model);
        }

        let exists = self
            .store
            .exists(&path)
            .await
            .with_context(|| format!("checking for comment file {path:?}"))?;
        if !exists {
            tracing::debug!(%document, %path, "creating comment file");
            self.store
                .write(&path, &CommentFile::default().to_json())
                .await
                .with_context(|| format!("creating comment file {path:?}"))?;
        }
        let contents = self
            .store
            .read(&path)
            .await
            .with_context(|| format!("reading comment file {path:?}"))?;
        let file = CommentFile::parse(&contents)
            .with_context(|| format!("parsing comment file {path:?}"))?;

        tracing::debug!(%document, comments = file.comments.len(), "loaded comment model");
        let model =
            CommentModel::from_file(document.clone(), self.registry.clone(), self.replica, file);
        self.models.insert(path.clone(), model.clone());
        self.documents.insert(document.clone(), path);
        self.set_current(document);
        Ok(model)
    }

    fn set_current(&mut self, document: &DocumentPath) {
        if self.current_document() == Some(document) {
            return;
        }
        let Some(model) = self.get(document) else {
            return;
        };
        // replacing the receiver unsubscribes from the previous model
        self.current = Some(Current {
            document: document.clone(),
            changes: model.subscribe(),
        });
        self.relay(ModelChanged {
            document: Some(document.clone()),
        });
    }

    fn relay(&mut self, event: ModelChanged) {
        self.listeners
            .retain_mut(|l| matches!(l.send(event.clone()), Ok(())));
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ModelChanged> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.listeners.push(sender);
        receiver
    }

    /// Changes of the current model received since the last call
    pub fn drain_current_changes(&mut self) -> Vec<Change> {
        let mut res = Vec::new();
        if let Some(current) = self.current.as_mut() {
            while let Ok(c) = current.changes.try_recv() {
                res.push(c);
            }
        }
        res
    }

    /// Writes the comments of `document` to its comment file
    pub async fn save(&self, document: &DocumentPath) -> anyhow::Result<()> {
        let path = self
            .documents
            .get(document)
            .with_context(|| format!("saving comments of {document}: document is not bound"))?;
        self.write_file(path).await
    }

    /// Saves every comment file with unsaved changes, returning how many were
    /// written
    pub async fn save_all(&self) -> anyhow::Result<usize> {
        let mut paths = self.models.keys().collect::<Vec<_>>();
        paths.sort_unstable();
        let mut saved = 0;
        for path in paths {
            if self.models[path].is_dirty() {
                self.write_file(path).await?;
                saved += 1;
            }
        }
        Ok(saved)
    }

    async fn write_file(&self, path: &str) -> anyhow::Result<()> {
        let model = self
            .models
            .get(path)
            .with_context(|| format!("no comment model loaded from {path:?}"))?;
        let (version, file) = model.snapshot();
        self.store
            .write(path, &file.to_json())
            .await
            .with_context(|| format!("writing comment file {path:?}"))?;
        model.mark_saved(version);
        tracing::debug!(%path, "saved comments");
        Ok(())
    }

    /// Unbinds `document`. The model is dropped from the manager once no
    /// bound document uses it anymore; unsaved changes are not written.
    pub fn close(&mut self, document: &DocumentPath) -> Option<CommentModel> {
        let path = self.documents.remove(document)?;
        let model = self.models.get(&path).cloned()?;
        model.unshare(document);
        if !self.documents.values().any(|p| *p == path) {
            self.models.remove(&path);
            if model.is_dirty() {
                tracing::warn!(%document, %path, "closing comment model with unsaved changes");
            }
        }
        if self.current_document() == Some(document) {
            self.current = None;
            self.relay(ModelChanged { document: None });
        }
        Some(model)
    }
}
