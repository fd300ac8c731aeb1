use crate::{
    anchor::Anchor,
    api::{Error, Target},
    document::{CellId, DocumentPath, OpenDocuments},
    factory::{mismatch, parse_target, LiveRegion, TargetFactory},
};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CellTarget {
    pub cell_id: CellId,
}

/// Comments on a whole notebook cell, found again by the cell's persisted id
#[derive(Clone, Copy, Debug, Default)]
pub struct CellFactory;

impl CellFactory {
    pub const KIND: &'static str = "cell";
}

impl TargetFactory for CellFactory {
    fn kind(&self) -> &str {
        CellFactory::KIND
    }

    fn target(&self, region: &LiveRegion<'_>) -> Result<Target, Error> {
        match region {
            LiveRegion::Cell { cell, .. } => Ok(serde_json::to_value(CellTarget {
                cell_id: cell.id.clone(),
            })
            .expect("serializing cell target")),
            _ => Err(mismatch(self, region)),
        }
    }

    fn resolve_target(
        &self,
        target: &Target,
        path: &DocumentPath,
        docs: &OpenDocuments,
    ) -> Option<Anchor> {
        let target: CellTarget = parse_target(self, target)?;
        let notebook = docs.notebook(path)?;
        let (index, _) = notebook.cell(&target.cell_id)?;
        Some(Anchor::Cell {
            path: path.clone(),
            cell: target.cell_id,
            index,
        })
    }
}
