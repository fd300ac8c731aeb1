use crate::{
    anchor::{Anchor, SelectionSnapshot},
    api::{Error, Target},
    document::{CellId, DocumentPath, OpenDocuments},
    factory::{mismatch, parse_target, LiveRegion, TargetFactory},
};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CellSelectionTarget {
    pub cell_id: CellId,

    #[serde(flatten)]
    pub selection: SelectionSnapshot,
}

/// Comments on a span of text inside a notebook cell
#[derive(Clone, Copy, Debug, Default)]
pub struct CellSelectionFactory;

impl CellSelectionFactory {
    pub const KIND: &'static str = "cell-selection";
}

impl TargetFactory for CellSelectionFactory {
    fn kind(&self) -> &str {
        CellSelectionFactory::KIND
    }

    fn target(&self, region: &LiveRegion<'_>) -> Result<Target, Error> {
        match region {
            LiveRegion::CellSelection { cell, range, .. } => {
                Ok(serde_json::to_value(CellSelectionTarget {
                    cell_id: cell.id.clone(),
                    selection: SelectionSnapshot::take(&cell.source, *range),
                })
                .expect("serializing cell selection target"))
            }
            _ => Err(mismatch(self, region)),
        }
    }

    fn resolve_target(
        &self,
        target: &Target,
        path: &DocumentPath,
        docs: &OpenDocuments,
    ) -> Option<Anchor> {
        let target: CellSelectionTarget = parse_target(self, target)?;
        let (index, cell) = docs.notebook(path)?.cell(&target.cell_id)?;
        let (range, freshness) = target.selection.locate(&cell.source);
        Some(Anchor::CellSelection {
            path: path.clone(),
            cell: target.cell_id,
            index,
            range,
            freshness,
        })
    }
}
