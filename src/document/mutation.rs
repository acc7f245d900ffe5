use super::NodeId;

/// A change to the observed subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Children of `target` were added or removed
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// The text of `target` changed
    CharacterData { target: NodeId },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            MutationRecord::ChildList { target, .. } => *target,
            MutationRecord::CharacterData { target } => *target,
        }
    }
}

/// Observation state of a document: which subtree is watched and what happened to it
#[derive(Debug, Clone)]
pub(crate) struct Observer {
    pub(crate) root: NodeId,
    pub(crate) records: Vec<MutationRecord>,
}

impl Observer {
    pub(crate) fn new(root: NodeId) -> Self {
        Observer {
            root,
            records: vec![],
        }
    }
}
