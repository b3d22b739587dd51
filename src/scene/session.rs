//! Editor session: document, selection, file and undo state

use std::path::{Path, PathBuf};

use super::document::LevelDocument;
use super::graph::NodeHandle;
use super::property::{EditError, EditableNode, PropertyKey, PropertyValue};
use crate::render::RenderView;
use crate::world::{load_as, save_document, LevelError, LevelInfo, Transform, DEFAULT_INDENT};

/// Maximum number of undo snapshots kept
const UNDO_LIMIT: usize = 100;

/// Main editor state for one open level
#[derive(Debug)]
pub struct EditorSession<D: LevelDocument> {
    /// The level being edited
    document: D,
    /// Node shown in the inspector and highlighted in the viewport
    selection: Option<NodeHandle>,
    /// File the level was loaded from or last saved to
    pub current_file: Option<PathBuf>,
    /// Unsaved changes exist
    pub dirty: bool,
    /// Indent width for written files
    pub indent: usize,
    undo_stack: Vec<D>,
    redo_stack: Vec<D>,
}

impl<D: LevelDocument> Default for EditorSession<D> {
    fn default() -> Self {
        Self::new(D::new_default())
    }
}

impl<D: LevelDocument> EditorSession<D> {
    pub fn new(document: D) -> Self {
        Self {
            document,
            selection: None,
            current_file: None,
            dirty: false,
            indent: DEFAULT_INDENT,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Create a session for a document that came from `path`
    pub fn with_file(document: D, path: PathBuf) -> Self {
        let mut session = Self::new(document);
        session.current_file = Some(path);
        session
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Replace the level with a fresh default one
    pub fn new_level(&mut self) {
        self.replace_document(D::new_default(), None);
        log::debug!("new {} level", D::SCHEMA);
    }

    /// Load a level from disk. On failure the current level is untouched.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LevelError> {
        let path = path.as_ref();
        let document = load_as::<D, _>(path)?;
        self.replace_document(document, Some(path.to_path_buf()));
        log::debug!("opened {}", path.display());
        Ok(())
    }

    fn replace_document(&mut self, document: D, path: Option<PathBuf>) {
        self.document = document;
        self.current_file = path;
        self.selection = None;
        self.dirty = false;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Write to the current file
    pub fn save(&mut self) -> Result<(), LevelError> {
        let path = self.current_file.clone().ok_or(LevelError::NoCurrentFile)?;
        save_document(&self.document, &path, self.indent)?;
        self.dirty = false;
        Ok(())
    }

    /// Write to a new file, which becomes the current file once the write succeeds
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LevelError> {
        let path = path.as_ref();
        save_document(&self.document, path, self.indent)?;
        self.current_file = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a node, or clear the selection with `None`
    pub fn select(&mut self, handle: Option<NodeHandle>) -> Result<(), EditError> {
        if let Some(h) = handle {
            if !self.document.graph().contains(h) {
                return Err(EditError::StaleHandle);
            }
        }
        self.selection = handle;
        Ok(())
    }

    pub fn selection(&self) -> Option<NodeHandle> {
        self.selection
    }

    pub fn selected_node(&self) -> Option<&D::Node> {
        self.selection.and_then(|h| self.document.graph().get(h))
    }

    fn require_selection(&self) -> Result<NodeHandle, EditError> {
        self.selection.ok_or(EditError::NoSelection)
    }

    // =========================================================================
    // Edits (each successful edit is one undo step)
    // =========================================================================

    fn edit<R>(&mut self, f: impl FnOnce(&mut D) -> Result<R, EditError>) -> Result<R, EditError> {
        let snapshot = self.document.clone();
        let result = f(&mut self.document)?;
        self.push_snapshot(snapshot);
        self.dirty = true;
        Ok(result)
    }

    fn push_undo(&mut self) {
        self.push_snapshot(self.document.clone());
    }

    fn push_snapshot(&mut self, snapshot: D) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > UNDO_LIMIT {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Add a node and select it
    pub fn add_node(
        &mut self,
        node_type: D::NodeType,
        placement: Option<Transform>,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, EditError> {
        let handle = self.edit(|doc| doc.add_node(node_type, placement, parent))?;
        self.selection = Some(handle);
        log::debug!("added {:?}", node_type);
        Ok(handle)
    }

    /// Duplicate a node and select the copy
    pub fn duplicate_node(&mut self, handle: NodeHandle) -> Result<NodeHandle, EditError> {
        let copy = self.edit(|doc| doc.duplicate_node(handle))?;
        self.selection = Some(copy);
        Ok(copy)
    }

    pub fn duplicate_selected(&mut self) -> Result<NodeHandle, EditError> {
        let handle = self.require_selection()?;
        self.duplicate_node(handle)
    }

    /// Remove a node and its subtree. The selection is cleared first when it
    /// points into the removed subtree.
    pub fn remove_node(&mut self, handle: NodeHandle) -> Result<usize, EditError> {
        if !self.document.graph().contains(handle) {
            return Err(EditError::StaleHandle);
        }
        if let Some(selected) = self.selection {
            if self.document.graph().is_in_subtree(handle, selected) {
                self.selection = None;
            }
        }
        let removed = self.edit(|doc| doc.remove_node(handle))?;
        log::debug!("removed {} node(s)", removed);
        Ok(removed)
    }

    pub fn remove_selected(&mut self) -> Result<usize, EditError> {
        let handle = self.require_selection()?;
        self.remove_node(handle)
    }

    /// Write one field of a node
    pub fn set_property(
        &mut self,
        handle: NodeHandle,
        key: PropertyKey,
        value: PropertyValue,
    ) -> Result<(), EditError> {
        self.edit(|doc| {
            doc.node_mut(handle)
                .ok_or(EditError::StaleHandle)?
                .set_property(key, value)
        })
    }

    pub fn set_selected_property(&mut self, key: PropertyKey, value: PropertyValue) -> Result<(), EditError> {
        let handle = self.require_selection()?;
        self.set_property(handle, key, value)
    }

    /// Read one field of a node
    pub fn property(&self, handle: NodeHandle, key: PropertyKey) -> Option<PropertyValue> {
        self.document.graph().get(handle)?.property(key)
    }

    /// Fields the inspector shows for a node, in form order
    pub fn editable_properties(&self, handle: NodeHandle) -> Vec<PropertyKey> {
        self.document
            .graph()
            .get(handle)
            .map(|n| n.properties())
            .unwrap_or_default()
    }

    pub fn info(&self) -> &LevelInfo {
        self.document.info()
    }

    /// Edit level-wide settings (title, tags, ambience)
    pub fn edit_info(&mut self, f: impl FnOnce(&mut LevelInfo)) {
        self.push_undo();
        f(self.document.info_mut());
        self.dirty = true;
    }

    // =========================================================================
    // Undo / redo
    // =========================================================================

    /// Returns false if there was nothing to undo
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.document, previous);
        self.redo_stack.push(current);
        self.after_history_step();
        true
    }

    /// Returns false if there was nothing to redo
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.document, next);
        self.undo_stack.push(current);
        self.after_history_step();
        true
    }

    fn after_history_step(&mut self) {
        self.dirty = true;
        if let Some(h) = self.selection {
            if !self.document.graph().contains(h) {
                self.selection = None;
            }
        }
    }

    /// Read-only snapshot for the viewport
    pub fn render_view(&self) -> RenderView<'_, D::Node> {
        RenderView {
            graph: self.document.graph(),
            selection: self.selection,
            ambience: &self.document.info().ambience,
        }
    }
}
