//! Term dictionary mapping terms to posting-list offsets.
//!
//! The dictionary is a character trie: one node per distinct byte
//! transition, children kept in insertion order. A node reached by a
//! full term carries the file offset of that term's posting-list chain
//! in the posting store, or [`NO_POSTINGS`] if the path exists only as
//! a prefix of longer terms.
//!
//! The whole tree is serialized once at the end of a build and
//! deserialized once at the start of a query session, as a pre-order
//! stream of `{symbol, posting_offset, child_count}` records.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{LancetError, Result};

/// Sentinel posting offset for a node with no posting list.
pub const NO_POSTINGS: i64 = -1;

#[derive(Debug)]
struct TrieNode {
    symbol: u8,
    posting_offset: i64,
    children: Vec<TrieNode>,
}

impl TrieNode {
    fn new(symbol: u8) -> Self {
        TrieNode {
            symbol,
            posting_offset: NO_POSTINGS,
            children: Vec::new(),
        }
    }
}

/// A character-trie term dictionary.
#[derive(Debug)]
pub struct TermDictionary {
    root: TrieNode,
}

impl Default for TermDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl TermDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        TermDictionary {
            root: TrieNode::new(0),
        }
    }

    /// Walk (and extend) the byte path for `term`, returning a mutable
    /// reference to the destination node's posting-offset field.
    ///
    /// The caller allocates a posting block on first use and stores its
    /// offset through the returned reference; repeat insertions of the
    /// same term land on the same node and see the stored offset.
    pub fn insert(&mut self, term: &[u8]) -> &mut i64 {
        let mut node = &mut self.root;
        for &byte in term {
            let index = match node.children.iter().position(|c| c.symbol == byte) {
                Some(index) => index,
                None => {
                    node.children.push(TrieNode::new(byte));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }
        &mut node.posting_offset
    }

    /// Look up the posting-list offset for `term`.
    ///
    /// Returns `None` when any byte transition is missing or the
    /// destination node has no posting list (prefix-only path).
    pub fn find(&self, term: &[u8]) -> Option<i64> {
        let mut node = &self.root;
        for &byte in term {
            node = node.children.iter().find(|c| c.symbol == byte)?;
        }
        if node.posting_offset == NO_POSTINGS {
            None
        } else {
            Some(node.posting_offset)
        }
    }

    /// Serialize the tree in pre-order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_node(&self.root, writer)
    }

    /// Deserialize a tree previously written by [`write_to`](Self::write_to).
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(TermDictionary {
            root: read_node(reader)?,
        })
    }
}

fn write_node<W: Write>(node: &TrieNode, writer: &mut W) -> Result<()> {
    writer.write_u8(node.symbol)?;
    writer.write_i64::<LittleEndian>(node.posting_offset)?;
    writer.write_i64::<LittleEndian>(node.children.len() as i64)?;
    for child in &node.children {
        write_node(child, writer)?;
    }
    Ok(())
}

fn read_node<R: Read>(reader: &mut R) -> Result<TrieNode> {
    let symbol = reader.read_u8()?;
    let posting_offset = reader.read_i64::<LittleEndian>()?;
    let child_count = reader.read_i64::<LittleEndian>()?;
    if child_count < 0 {
        return Err(LancetError::storage(format!(
            "Corrupt dictionary: negative child count {child_count}"
        )));
    }

    let mut node = TrieNode {
        symbol,
        posting_offset,
        children: Vec::with_capacity(child_count as usize),
    };
    for _ in 0..child_count {
        node.children.push(read_node(reader)?);
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find() {
        let mut dict = TermDictionary::new();

        let slot = dict.insert(b"hello");
        assert_eq!(*slot, NO_POSTINGS);
        *slot = 42;

        assert_eq!(dict.find(b"hello"), Some(42));
        assert_eq!(dict.find(b"world"), None);
    }

    #[test]
    fn test_insert_is_idempotent_per_term() {
        let mut dict = TermDictionary::new();

        *dict.insert(b"term") = 7;
        // A second insertion lands on the same node.
        assert_eq!(*dict.insert(b"term"), 7);
    }

    #[test]
    fn test_prefix_is_not_a_term() {
        let mut dict = TermDictionary::new();

        *dict.insert(b"hedgehog") = 10;
        assert_eq!(dict.find(b"hedge"), None);

        *dict.insert(b"hedge") = 20;
        assert_eq!(dict.find(b"hedge"), Some(20));
        assert_eq!(dict.find(b"hedgehog"), Some(10));
    }

    #[test]
    fn test_shared_prefixes() {
        let mut dict = TermDictionary::new();

        *dict.insert(b"car") = 1;
        *dict.insert(b"cart") = 2;
        *dict.insert(b"care") = 3;
        *dict.insert(b"dog") = 4;

        assert_eq!(dict.find(b"car"), Some(1));
        assert_eq!(dict.find(b"cart"), Some(2));
        assert_eq!(dict.find(b"care"), Some(3));
        assert_eq!(dict.find(b"dog"), Some(4));
        assert_eq!(dict.find(b"ca"), None);
        assert_eq!(dict.find(b"carts"), None);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut dict = TermDictionary::new();
        let terms: &[(&[u8], i64)] = &[
            (b"alpha", 0),
            (b"alphabet", 4096),
            (b"beta", 8192),
            (b"be", 12288),
        ];
        for &(term, offset) in terms {
            *dict.insert(term) = offset;
        }

        let mut buf = Vec::new();
        dict.write_to(&mut buf).unwrap();

        let restored = TermDictionary::read_from(&mut buf.as_slice()).unwrap();
        for &(term, offset) in terms {
            assert_eq!(restored.find(term), Some(offset), "term {term:?}");
        }
        assert_eq!(restored.find(b"alph"), None);
        assert_eq!(restored.find(b"gamma"), None);
    }

    #[test]
    fn test_empty_dictionary_roundtrip() {
        let dict = TermDictionary::new();

        let mut buf = Vec::new();
        dict.write_to(&mut buf).unwrap();

        let restored = TermDictionary::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(restored.find(b"anything"), None);
    }
}
