use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    anchor::Anchor,
    api::{Comment, Error, Identity, Target},
    document::{DocumentPath, OpenDocuments},
    factories::{CellFactory, CellSelectionFactory, DocumentFactory, TextSelectionFactory},
    factory::{LiveRegion, TargetFactory},
};

/// Maps comment types to the factory owning their targets
#[derive(Clone, Default)]
pub struct CommentRegistry {
    factories: HashMap<String, Arc<dyn TargetFactory>>,
}

impl fmt::Debug for CommentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl CommentRegistry {
    pub fn new() -> CommentRegistry {
        CommentRegistry::default()
    }

    /// Registry with all the built-in factories
    pub fn with_defaults() -> CommentRegistry {
        let mut registry = CommentRegistry::new();
        for factory in [
            Arc::new(DocumentFactory) as Arc<dyn TargetFactory>,
            Arc::new(CellFactory),
            Arc::new(CellSelectionFactory),
            Arc::new(TextSelectionFactory),
        ] {
            registry
                .add_factory(factory)
                .expect("built-in factories have distinct kinds");
        }
        registry
    }

    /// Fails if a factory is already registered for the same kind: resolving
    /// existing comments with the wrong factory would anchor them to the
    /// wrong regions.
    pub fn add_factory(&mut self, factory: Arc<dyn TargetFactory>) -> Result<(), Error> {
        let kind = String::from(factory.kind());
        if self.factories.contains_key(&kind) {
            tracing::error!(%kind, "refusing to register a second factory for comment type");
            return Err(Error::DuplicateFactory(kind));
        }
        tracing::debug!(%kind, "registered comment factory");
        self.factories.insert(kind, factory);
        Ok(())
    }

    pub fn get_factory(&self, kind: &str) -> Option<Arc<dyn TargetFactory>> {
        self.factories.get(kind).cloned()
    }

    pub fn get_target(&self, kind: &str, region: &LiveRegion<'_>) -> Result<Target, Error> {
        self.factory(kind)?.target(region)
    }

    pub fn create_comment(
        &self,
        kind: &str,
        region: &LiveRegion<'_>,
        text: String,
        identity: Identity,
    ) -> Result<Comment, Error> {
        self.factory(kind)?.create_comment(region, text, identity)
    }

    /// Resolves the anchor of a stored comment. Comments whose type has no
    /// registered factory are never resolved.
    pub fn resolve(
        &self,
        comment: &Comment,
        path: &DocumentPath,
        docs: &OpenDocuments,
    ) -> Option<Anchor> {
        self.factories
            .get(&comment.kind)?
            .resolve_target(&comment.target, path, docs)
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds = self.factories.keys().map(|k| k.as_str()).collect::<Vec<_>>();
        kinds.sort_unstable();
        kinds
    }

    fn factory(&self, kind: &str) -> Result<&Arc<dyn TargetFactory>, Error> {
        self.factories
            .get(kind)
            .ok_or_else(|| Error::FactoryNotFound(String::from(kind)))
    }
}
