//! # Structural mutations
//!
//! Splices a freshly built fragment into the live block tree.
//!
//! ## Target resolution
//!
//! - **Prepend / Append** address a layout block by its own id. The first
//!   block carrying the id in left-to-right pre-order is the target; if it is
//!   not a layout block the mutation fails with `NotAContainer`.
//! - **Swap** addresses a block through its parent. Layout blocks are
//!   visited in pre-order and the first one whose direct children include
//!   the id has that child replaced by the whole fragment (1:N).
//!
//! A missing target leaves the tree untouched and is reported as
//! `TargetNotFound`.
//!
//! An Interactive region must keep holding controls fields only, with unique
//! names, and fields may not land anywhere else. A fragment that would break
//! either rule is rejected with `InvalidContent` before anything is spliced.

use dossier_blocks::{validate_fields, Block, BlockKind, BuildError, BuildResult, Method};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Target not found: {target}")]
    TargetNotFound { target: String },

    #[error("Target {target} is not a layout block")]
    NotAContainer { target: String },

    #[error("Fragment cannot be placed at {target}: {reason}")]
    InvalidContent { target: String, reason: String },
}

/// One structural edit: where a fragment goes and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutation {
    pub target: String,
    pub method: Method,
}

/// Resolved location of a mutation, as a child-index path from the root
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    /// Path to the container itself
    Container(Vec<usize>),
    /// Path to the parent plus the child index to replace
    Child(Vec<usize>, usize),
}

impl Mutation {
    pub fn new(target: impl Into<String>, method: Method) -> Self {
        Self {
            target: target.into(),
            method,
        }
    }

    /// Check the target resolves without touching the tree
    pub fn validate(&self, root: &Block) -> Result<(), MutationError> {
        self.locate(root).map(|_| ())
    }

    /// Splice `fragment` into the tree. Returns the block removed by a swap.
    pub fn apply(&self, root: &mut Block, fragment: Vec<Block>) -> Result<Option<Block>, MutationError> {
        let location = self.locate(root)?;

        match location {
            Location::Container(path) => {
                let container = Self::block_at_mut(root, &path).ok_or_else(|| self.not_found())?;
                Self::check_content(container, None, &fragment).map_err(|e| self.invalid_content(e))?;
                let region = container.region_mut().ok_or_else(|| self.not_a_container())?;
                match self.method {
                    Method::Prepend => region.prepend(fragment),
                    _ => region.append(fragment),
                }
                Self::refresh_parameters(container);
                Ok(None)
            }
            Location::Child(path, idx) => {
                let parent = Self::block_at_mut(root, &path).ok_or_else(|| self.not_found())?;
                Self::check_content(parent, Some(idx), &fragment).map_err(|e| self.invalid_content(e))?;
                let region = parent.region_mut().ok_or_else(|| self.not_a_container())?;
                let removed = region.swap(idx, fragment);
                Self::refresh_parameters(parent);
                Ok(removed)
            }
        }
    }

    fn locate(&self, root: &Block) -> Result<Location, MutationError> {
        match self.method {
            Method::Prepend | Method::Append => {
                let mut path = Vec::new();
                let block = Self::find_path(root, &self.target, &mut path).ok_or_else(|| self.not_found())?;
                if block.is_layout() {
                    Ok(Location::Container(path))
                } else {
                    Err(self.not_a_container())
                }
            }
            Method::Swap => {
                let mut path = Vec::new();
                let idx = Self::find_parent_path(root, &self.target, &mut path).ok_or_else(|| self.not_found())?;
                Ok(Location::Child(path, idx))
            }
        }
    }

    /// First block with `id` in pre-order, recording its index path
    fn find_path<'a>(block: &'a Block, id: &str, path: &mut Vec<usize>) -> Option<&'a Block> {
        if block.id() == Some(id) {
            return Some(block);
        }
        for (i, child) in block.children().iter().enumerate() {
            path.push(i);
            if let Some(found) = Self::find_path(child, id, path) {
                return Some(found);
            }
            path.pop();
        }
        None
    }

    /// First layout block in pre-order with a direct child carrying `id`.
    /// Leaves `path` pointing at that layout block and returns the child index.
    fn find_parent_path(block: &Block, id: &str, path: &mut Vec<usize>) -> Option<usize> {
        let region = block.region()?;
        if let Some(idx) = region.position(id) {
            return Some(idx);
        }
        for (i, child) in region.children().iter().enumerate() {
            if !child.is_layout() {
                continue;
            }
            path.push(i);
            if let Some(idx) = Self::find_parent_path(child, id, path) {
                return Some(idx);
            }
            path.pop();
        }
        None
    }

    fn block_at_mut<'a>(root: &'a mut Block, path: &[usize]) -> Option<&'a mut Block> {
        let mut current = root;
        for &i in path {
            current = current.region_mut()?.children_mut().get_mut(i)?;
        }
        Some(current)
    }

    /// Check the children `container` would end up with, `replaced` being
    /// the index a swap removes
    fn check_content(container: &Block, replaced: Option<usize>, fragment: &[Block]) -> BuildResult<()> {
        if container.as_interactive().is_some() {
            let kept = container
                .children()
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != replaced)
                .map(|(_, block)| block);
            return validate_fields(kept.chain(fragment));
        }

        match fragment.iter().find_map(Block::as_field) {
            Some(field) => Err(BuildError::MalformedNode {
                block: container.kind_name().to_string(),
                reason: format!("field '{}' must be inside an Interactive region", field.name),
            }),
            None => Ok(()),
        }
    }

    /// Interactive regions keep their parameter store in step with the fields
    /// they hold
    fn refresh_parameters(container: &mut Block) {
        if let BlockKind::Interactive(interactive) = &mut container.kind {
            interactive.parameters.sync(interactive.region.children());
        }
    }

    fn not_found(&self) -> MutationError {
        MutationError::TargetNotFound {
            target: self.target.clone(),
        }
    }

    fn invalid_content(&self, error: BuildError) -> MutationError {
        MutationError::InvalidContent {
            target: self.target.clone(),
            reason: error.to_string(),
        }
    }

    fn not_a_container(&self) -> MutationError {
        MutationError::NotAContainer {
            target: self.target.clone(),
        }
    }
}

/// Result of applying a mutation to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    /// New document version
    pub version: u64,
    pub mutation: Mutation,
    /// Number of blocks spliced in
    pub inserted: usize,
    /// Id of the block a swap removed, if it had one
    pub removed: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_blocks::{BlockMeta, ControlsField, FieldValue, Group, Interactive, Region, View};
    use dossier_parser::SerializedNode;

    fn leaf(id: &str) -> Block {
        Block::new(BlockMeta::with_id(id), BlockKind::Empty)
    }

    fn group(id: &str, children: Vec<Block>) -> Block {
        Block::new(
            BlockMeta::with_id(id),
            BlockKind::Group(Group {
                columns: 1,
                region: Region::new(children),
            }),
        )
    }

    fn view(children: Vec<Block>) -> Block {
        Block::new(
            BlockMeta::with_id("root"),
            BlockKind::View(View {
                layout: None,
                fragment: false,
                region: Region::new(children),
            }),
        )
    }

    fn field(name: &str, initial: &str) -> Block {
        let node = SerializedNode::new("String")
            .with_attr("name", name)
            .with_attr("initialValue", initial);
        Block::new(BlockMeta::with_id(name), BlockKind::Field(ControlsField::string(&node).unwrap()))
    }

    fn interactive(id: &str, fields: Vec<Block>) -> Block {
        let node = SerializedNode::new("Interactive").with_attr("id", id);
        Block::new(
            BlockMeta::with_id(id),
            BlockKind::Interactive(Interactive::from_node(&node, fields).unwrap()),
        )
    }

    fn kinds(block: &Block) -> Vec<&'static str> {
        block.children().iter().map(Block::kind_name).collect()
    }

    fn ids(block: &Block) -> Vec<&str> {
        block.children().iter().filter_map(Block::id).collect()
    }

    #[test]
    fn test_swap_direct_child_one_to_many() {
        let mut root = view(vec![leaf("a"), leaf("c1"), leaf("b")]);
        let removed = Mutation::new("c1", Method::Swap)
            .apply(&mut root, vec![leaf("x"), leaf("y")])
            .unwrap();
        assert_eq!(removed.and_then(|b| b.meta.id), Some("c1".to_string()));
        assert_eq!(ids(&root), ["a", "x", "y", "b"]);
    }

    #[test]
    fn test_swap_nested_child() {
        let mut root = view(vec![group("g", vec![leaf("a"), leaf("t")])]);
        Mutation::new("t", Method::Swap).apply(&mut root, vec![leaf("n")]).unwrap();
        assert_eq!(ids(&root.children()[0]), ["a", "n"]);
    }

    #[test]
    fn test_swap_with_empty_fragment_removes() {
        let mut root = view(vec![leaf("a"), leaf("b")]);
        Mutation::new("a", Method::Swap).apply(&mut root, Vec::new()).unwrap();
        assert_eq!(ids(&root), ["b"]);
    }

    #[test]
    fn test_append_and_prepend_target_container() {
        let mut root = view(vec![group("g", vec![leaf("a")])]);
        Mutation::new("g", Method::Append).apply(&mut root, vec![leaf("z")]).unwrap();
        Mutation::new("g", Method::Prepend).apply(&mut root, vec![leaf("p")]).unwrap();
        assert_eq!(ids(&root.children()[0]), ["p", "a", "z"]);

        Mutation::new("root", Method::Append).apply(&mut root, vec![leaf("end")]).unwrap();
        assert_eq!(ids(&root), ["g", "end"]);
    }

    #[test]
    fn test_insert_into_leaf_is_rejected() {
        let mut root = view(vec![leaf("a")]);
        let err = Mutation::new("a", Method::Append).apply(&mut root, vec![leaf("z")]).unwrap_err();
        assert_eq!(err, MutationError::NotAContainer { target: "a".to_string() });
        assert_eq!(ids(&root), ["a"]);
    }

    #[test]
    fn test_missing_target_leaves_tree() {
        let mut root = view(vec![leaf("a")]);
        for method in [Method::Prepend, Method::Append, Method::Swap] {
            let err = Mutation::new("nope", method).apply(&mut root, vec![leaf("z")]).unwrap_err();
            assert!(matches!(err, MutationError::TargetNotFound { .. }));
        }
        assert_eq!(ids(&root), ["a"]);
    }

    #[test]
    fn test_root_cannot_be_swapped() {
        let root = view(vec![leaf("a")]);
        assert!(Mutation::new("root", Method::Swap).validate(&root).is_err());
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first_container_in_preorder() {
        // The root's own child list is checked before any nested group
        let mut root = view(vec![group("g", vec![leaf("dup")]), leaf("dup")]);
        Mutation::new("dup", Method::Swap).apply(&mut root, vec![leaf("new")]).unwrap();
        assert_eq!(ids(&root), ["g", "new"]);
        assert_eq!(ids(&root.children()[0]), ["dup"]);

        let mut root = view(vec![group("g", vec![group("dup", Vec::new())]), group("dup", Vec::new())]);
        Mutation::new("dup", Method::Append).apply(&mut root, vec![leaf("x")]).unwrap();
        assert_eq!(root.children()[0].children()[0].children().len(), 1);
        assert!(root.children()[1].children().is_empty());
    }

    #[test]
    fn test_insert_into_interactive_rejects_duplicate_and_non_fields() {
        let mut root = view(vec![interactive("c1", vec![field("a", "one")])]);

        for method in [Method::Append, Method::Prepend] {
            let err = Mutation::new("c1", method)
                .apply(&mut root, vec![field("a", "two")])
                .unwrap_err();
            assert!(matches!(err, MutationError::InvalidContent { ref target, .. } if target == "c1"));

            let err = Mutation::new("c1", method)
                .apply(&mut root, vec![field("b", "two"), leaf("hi")])
                .unwrap_err();
            assert!(matches!(err, MutationError::InvalidContent { .. }));
        }

        let region = &root.children()[0];
        assert_eq!(kinds(region), ["Field"]);
        let parameters = region.as_interactive().unwrap().submission().parameters;
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters["a"], FieldValue::from("one"));
    }

    #[test]
    fn test_insert_new_field_seeds_parameter() {
        let mut root = view(vec![interactive("c1", vec![field("a", "one")])]);
        Mutation::new("c1", Method::Append)
            .apply(&mut root, vec![field("b", "two")])
            .unwrap();

        let parameters = root.children()[0].as_interactive().unwrap().submission().parameters;
        assert_eq!(parameters["a"], FieldValue::from("one"));
        assert_eq!(parameters["b"], FieldValue::from("two"));
    }

    #[test]
    fn test_swap_inside_interactive_checks_resulting_fields() {
        let mut root = view(vec![interactive("c1", vec![field("a", "one"), field("b", "two")])]);

        // Replacing `a` with a field of the same name is fine
        Mutation::new("a", Method::Swap)
            .apply(&mut root, vec![field("a", "fresh")])
            .unwrap();

        let err = Mutation::new("a", Method::Swap)
            .apply(&mut root, vec![field("b", "clash")])
            .unwrap_err();
        assert!(matches!(err, MutationError::InvalidContent { .. }));

        let err = Mutation::new("b", Method::Swap).apply(&mut root, vec![leaf("x")]).unwrap_err();
        assert!(matches!(err, MutationError::InvalidContent { .. }));

        assert_eq!(ids(&root.children()[0]), ["a", "b"]);
    }

    #[test]
    fn test_fields_cannot_land_outside_interactive() {
        let mut root = view(vec![group("g", vec![leaf("t")])]);

        let err = Mutation::new("g", Method::Append)
            .apply(&mut root, vec![field("a", "one")])
            .unwrap_err();
        assert!(matches!(err, MutationError::InvalidContent { .. }));

        let err = Mutation::new("t", Method::Swap)
            .apply(&mut root, vec![field("a", "one")])
            .unwrap_err();
        assert!(matches!(err, MutationError::InvalidContent { .. }));

        assert_eq!(ids(&root.children()[0]), ["t"]);
    }
}
