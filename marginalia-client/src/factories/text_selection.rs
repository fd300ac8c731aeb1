use crate::{
    anchor::{Anchor, SelectionSnapshot},
    api::{Error, Target},
    document::{DocumentPath, OpenDocuments},
    factory::{mismatch, parse_target, LiveRegion, TargetFactory},
};

/// Comments on a span of a plain text document
#[derive(Clone, Copy, Debug, Default)]
pub struct TextSelectionFactory;

impl TextSelectionFactory {
    pub const KIND: &'static str = "text-selection";
}

impl TargetFactory for TextSelectionFactory {
    fn kind(&self) -> &str {
        TextSelectionFactory::KIND
    }

    fn target(&self, region: &LiveRegion<'_>) -> Result<Target, Error> {
        match region {
            LiveRegion::TextSelection { document, range } => Ok(serde_json::to_value(
                SelectionSnapshot::take(&document.text, *range),
            )
            .expect("serializing text selection target")),
            _ => Err(mismatch(self, region)),
        }
    }

    fn resolve_target(
        &self,
        target: &Target,
        path: &DocumentPath,
        docs: &OpenDocuments,
    ) -> Option<Anchor> {
        let snapshot: SelectionSnapshot = parse_target(self, target)?;
        let document = docs.text(path)?;
        let (range, freshness) = snapshot.locate(&document.text);
        Some(Anchor::TextSelection {
            path: path.clone(),
            range,
            freshness,
        })
    }
}
