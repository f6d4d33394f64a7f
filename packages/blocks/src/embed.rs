use crate::block::{Block, BlockKind};
use crate::options::Mode;

/// True when there is a single route from `block` down to one leaf.
///
/// A layout block passes only with exactly one child, and the check continues
/// into that child. Leaves and `Select` blocks end the check successfully.
pub fn is_single_leaf_path(block: &Block) -> bool {
    if matches!(block.kind, BlockKind::Select(_)) {
        return true;
    }

    match block.region() {
        None => true,
        Some(region) => match region.children() {
            [only] => is_single_leaf_path(only),
            _ => false,
        },
    }
}

/// Whether an embedded report consists of one block and needs to fill its
/// iframe
pub fn is_single_block_embed(root: &Block, mode: Mode) -> bool {
    mode == Mode::Embed && is_single_leaf_path(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockMeta;
    use crate::layout::{Group, Region, Select, SelectType};

    fn leaf() -> Block {
        Block::new(BlockMeta::default(), BlockKind::Empty)
    }

    fn group(children: Vec<Block>) -> Block {
        Block::new(
            BlockMeta::default(),
            BlockKind::Group(Group {
                columns: 1,
                region: Region::new(children),
            }),
        )
    }

    #[test]
    fn test_nested_single_children() {
        assert!(is_single_leaf_path(&group(vec![group(vec![leaf()])])));
        assert!(!is_single_leaf_path(&group(vec![group(vec![leaf(), leaf()])])));
        assert!(!is_single_leaf_path(&group(Vec::new())));
    }

    #[test]
    fn test_select_terminates() {
        let select = Block::new(
            BlockMeta::default(),
            BlockKind::Select(Select {
                select_type: SelectType::Tabs,
                layout: None,
                region: Region::new(vec![leaf(), leaf()]),
            }),
        );
        assert!(is_single_leaf_path(&group(vec![select])));
    }

    #[test]
    fn test_view_mode_is_never_single_block_embed() {
        let tree = group(vec![leaf()]);
        assert!(is_single_block_embed(&tree, Mode::Embed));
        assert!(!is_single_block_embed(&tree, Mode::View));
    }
}
