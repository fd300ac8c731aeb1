use std::{collections::HashMap, fmt};

/// Normalized, root-relative path of a document: no leading slash, no empty,
/// `.` or `..` components. `..` pops the previous component and never climbs
/// above the root.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
#[serde(from = "String", into = "String")]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn new(path: &str) -> DocumentPath {
        let mut components = Vec::new();
        for c in path.split('/') {
            match c {
                "" | "." => (),
                ".." => {
                    components.pop();
                }
                c => components.push(c),
            }
        }
        DocumentPath(components.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory part, if the document is not at the root
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(dir, _)| dir)
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map(|(_, f)| f).unwrap_or(&self.0)
    }

    /// File name without its last extension. Dotfiles keep their name.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rsplit_once('.') {
            Some(("", _)) | None => name,
            Some((stem, _)) => stem,
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentPath {
    fn from(s: String) -> DocumentPath {
        DocumentPath::new(&s)
    }
}

impl From<DocumentPath> for String {
    fn from(p: DocumentPath) -> String {
        p.0
    }
}

impl From<&str> for DocumentPath {
    fn from(s: &str) -> DocumentPath {
        DocumentPath::new(s)
    }
}

/// Identifier persisted in the notebook file for each cell
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct CellId(pub String);

impl From<&str> for CellId {
    fn from(s: &str) -> CellId {
        CellId(String::from(s))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cell {
    pub id: CellId,
    pub source: String,
}

impl Cell {
    pub fn new(id: impl Into<CellId>, source: impl Into<String>) -> Cell {
        Cell {
            id: id.into(),
            source: source.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notebook {
    pub path: DocumentPath,
    pub cells: Vec<Cell>,
}

impl Notebook {
    pub fn new(path: DocumentPath, cells: Vec<Cell>) -> Notebook {
        Notebook { path, cells }
    }

    /// Returns the cell with this id along with its current index
    pub fn cell(&self, id: &CellId) -> Option<(usize, &Cell)> {
        self.cells.iter().enumerate().find(|(_, c)| c.id == *id)
    }

    pub fn cell_mut(&mut self, id: &CellId) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.id == *id)
    }

    pub fn remove_cell(&mut self, id: &CellId) -> Option<Cell> {
        let idx = self.cells.iter().position(|c| c.id == *id)?;
        Some(self.cells.remove(idx))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextDocument {
    pub path: DocumentPath,
    pub text: String,
}

impl TextDocument {
    pub fn new(path: DocumentPath, text: impl Into<String>) -> TextDocument {
        TextDocument {
            path,
            text: text.into(),
        }
    }

    /// Replaces `delete` chars starting at char offset `at` with `insert`,
    /// the way a remote collaborator's edit lands in the local buffer
    pub fn splice(&mut self, at: usize, delete: usize, insert: &str) {
        let mut chars = self.text.chars().collect::<Vec<_>>();
        let at = at.min(chars.len());
        let end = (at + delete).min(chars.len());
        chars.splice(at..end, insert.chars());
        self.text = chars.into_iter().collect();
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Document {
    Notebook(Notebook),
    Text(TextDocument),
}

impl Document {
    pub fn path(&self) -> &DocumentPath {
        match self {
            Document::Notebook(n) => &n.path,
            Document::Text(t) => &t.path,
        }
    }
}

/// The documents currently open in the host, against which stored anchors
/// get resolved
#[derive(Clone, Debug, Default)]
pub struct OpenDocuments {
    docs: HashMap<DocumentPath, Document>,
}

impl OpenDocuments {
    pub fn new() -> OpenDocuments {
        OpenDocuments::default()
    }

    pub fn open(&mut self, doc: Document) {
        self.docs.insert(doc.path().clone(), doc);
    }

    pub fn close(&mut self, path: &DocumentPath) -> Option<Document> {
        self.docs.remove(path)
    }

    pub fn get(&self, path: &DocumentPath) -> Option<&Document> {
        self.docs.get(path)
    }

    pub fn notebook(&self, path: &DocumentPath) -> Option<&Notebook> {
        match self.docs.get(path)? {
            Document::Notebook(n) => Some(n),
            Document::Text(_) => None,
        }
    }

    pub fn notebook_mut(&mut self, path: &DocumentPath) -> Option<&mut Notebook> {
        match self.docs.get_mut(path)? {
            Document::Notebook(n) => Some(n),
            Document::Text(_) => None,
        }
    }

    pub fn text(&self, path: &DocumentPath) -> Option<&TextDocument> {
        match self.docs.get(path)? {
            Document::Text(t) => Some(t),
            Document::Notebook(_) => None,
        }
    }

    pub fn text_mut(&mut self, path: &DocumentPath) -> Option<&mut TextDocument> {
        match self.docs.get_mut(path)? {
            Document::Text(t) => Some(t),
            Document::Notebook(_) => None,
        }
    }
}
