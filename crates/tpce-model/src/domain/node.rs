use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// 1-based machine number inside one provisioned cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered selection of machines in a cluster.
///
/// Renders the way the provisioning backend expects node selectors: `1-3` for a
/// contiguous ascending run and `1,3,5` otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeList(Vec<NodeId>);

impl NodeList {
    /// Nodes `first..=last`; empty when `last < first`.
    pub fn range(first: u32, last: u32) -> Self {
        Self((first..=last).map(NodeId).collect())
    }

    pub fn single(node: u32) -> Self {
        Self(vec![NodeId(node)])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    fn is_contiguous(&self) -> bool {
        self.0.windows(2).all(|w| w[1].0 == w[0].0 + 1)
    }
}

impl From<Vec<NodeId>> for NodeList {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self(nodes)
    }
}

impl fmt::Display for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) if self.0.len() > 1 && self.is_contiguous() => {
                write!(f, "{first}-{last}")
            }
            _ => {
                for (i, node) in self.0.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{node}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for NodeList {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidNodeList(s.to_string());
        let parse = |v: &str| v.trim().parse::<u32>().ok().filter(|n| *n > 0);

        let mut nodes = Vec::new();
        for part in s.split(',') {
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let (lo, hi) = (parse(lo).ok_or_else(invalid)?, parse(hi).ok_or_else(invalid)?);
                    if hi < lo {
                        return Err(invalid());
                    }
                    nodes.extend((lo..=hi).map(NodeId));
                }
                None => nodes.push(NodeId(parse(part).ok_or_else(invalid)?)),
            }
        }
        Ok(Self(nodes))
    }
}

/// A machine together with its internal network address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddr {
    pub node: NodeId,
    pub ip: String,
}

impl NodeAddr {
    pub fn new(node: NodeId, ip: impl Into<String>) -> Self {
        Self {
            node,
            ip: ip.into(),
        }
    }
}
