use crate::{
    anchor::Anchor,
    api::{Error, Target},
    document::{DocumentPath, OpenDocuments},
    factory::{mismatch, LiveRegion, TargetFactory},
};

/// Comments on a whole file. The target is `null`: the comment file already
/// says which document it belongs to.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentFactory;

impl DocumentFactory {
    pub const KIND: &'static str = "document";
}

impl TargetFactory for DocumentFactory {
    fn kind(&self) -> &str {
        DocumentFactory::KIND
    }

    fn target(&self, region: &LiveRegion<'_>) -> Result<Target, Error> {
        match region {
            LiveRegion::Document(_) => Ok(Target::Null),
            _ => Err(mismatch(self, region)),
        }
    }

    fn resolve_target(
        &self,
        _target: &Target,
        path: &DocumentPath,
        docs: &OpenDocuments,
    ) -> Option<Anchor> {
        docs.get(path).map(|d| Anchor::Document {
            path: d.path().clone(),
        })
    }
}
