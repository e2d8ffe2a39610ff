//! Adaptive (dynamic) Huffman coding, FGK/Vitter style.
//!
//! The tree lives in a flat arena of [`Node`]s addressed by 1-based id (0
//! means "no node"). Every node carries a **number**: listing live nodes in
//! ascending number order must yield non-decreasing weight, with siblings
//! adjacent in that ordering (the sibling property). A single always-present
//! leaf of weight zero, the NYT ("not yet transmitted") node, is used to
//! introduce bytes the tree has never seen.
//!
//! [`AdaptiveHuffmanWriter`]/[`AdaptiveHuffmanReader`] expose [`ByteSink`]/
//! [`ByteSource`] themselves, each driving their own private
//! [`BitStreamWriter`]/[`BitStreamReader`] over the byte sink/source they
//! wrap -- this is what lets a dictionary codec's bit-level output be packed
//! straight through Huffman coding by stacking another `BitStreamWriter` on
//! the outside (see [`crate::lz78`], [`crate::lzw`]).

use std::io;
use crate::bitstream::{BitStreamReader, BitStreamWriter, ByteSink, ByteSource};

#[derive(Clone, Copy)]
struct Node {
    byte: u8,
    number: u16,
    weight: u64,
    parent: u16,
    left: u16,
    right: u16,
}

/// The dynamic Huffman tree. Node ids are 1-based; `root` never moves once
/// constructed (id 1 is always the overall root).
struct Tree {
    memory: Vec<Node>,
    byte2node: [u16; 256],
    number2node: Vec<u16>,
    null: u16,
    root: u16,
}

impl Tree {
    fn new() -> Self {
        let mut number2node = vec![0u16; 513];
        number2node[512] = 1;
        Tree {
            memory: vec![Node { byte: 0, number: 512, weight: 0, parent: 0, left: 0, right: 0 }],
            byte2node: [0u16; 256],
            number2node,
            null: 1,
            root: 1,
        }
    }

    fn get(&self, id: u16) -> Node {
        self.memory[(id - 1) as usize]
    }

    fn get_mut(&mut self, id: u16) -> &mut Node {
        &mut self.memory[(id - 1) as usize]
    }

    fn is_leaf(&self, id: u16) -> bool {
        self.get(id).left == 0
    }

    /// Root-to-leaf bit path for `leaf`, packed for LSB-first transmission.
    fn get_code(&self, leaf: u16) -> (u64, u32) {
        let mut bits = Vec::new();
        let mut cur = leaf;
        while cur != self.root {
            let node = self.get(cur);
            let parent = self.get(node.parent);
            bits.push(parent.right == cur);
            cur = node.parent;
        }
        let mut code = 0u64;
        for (i, bit) in bits.iter().rev().enumerate() {
            if *bit {
                code |= 1u64 << i;
            }
        }
        (code, bits.len() as u32)
    }

    /// Splits the NYT leaf into a fresh NYT and a leaf for `byte`.
    fn add_new_byte(&mut self, byte: u8) {
        log::trace!("adding new byte {byte:#04x} to Huffman tree");
        let old_null = self.null;
        let old_number = self.get(old_null).number;
        let new_nyt_id = self.memory.len() as u16 + 1;
        self.memory.push(Node { byte: 0, number: old_number - 2, weight: 0, parent: old_null, left: 0, right: 0 });
        let new_leaf_id = self.memory.len() as u16 + 1;
        self.memory.push(Node { byte, number: old_number - 1, weight: 0, parent: old_null, left: 0, right: 0 });
        {
            let escape = self.get_mut(old_null);
            escape.left = new_nyt_id;
            escape.right = new_leaf_id;
        }
        self.byte2node[byte as usize] = new_leaf_id;
        self.number2node[(old_number - 2) as usize] = new_nyt_id;
        self.number2node[(old_number - 1) as usize] = new_leaf_id;
        self.null = new_nyt_id;
        self.update_tree(new_leaf_id);
    }

    /// Highest-numbered node sharing `node_id`'s current weight.
    fn highest_node(&self, node_id: u16) -> u16 {
        let node = self.get(node_id);
        let mut number = node.number;
        while (number as usize + 1) < self.number2node.len()
            && self.get(self.number2node[number as usize + 1]).weight == node.weight
        {
            number += 1;
        }
        self.number2node[number as usize]
    }

    /// Swaps `a` and `b`'s position in the tree (parent pointers, parent's
    /// child slots, number2node entries, and `number`/`parent` fields).
    /// Children and byte stay with the physical node. No-op for root,
    /// self-swap, or a parent/child pair.
    fn exchange(&mut self, a: u16, b: u16) {
        if a == 0 || b == 0 || a == self.root || b == self.root || a == b {
            return;
        }
        let pa = self.get(a).parent;
        let pb = self.get(b).parent;
        if pa == b || pb == a {
            return;
        }
        let a_is_right = self.get(pa).right == a;
        if a_is_right {
            self.get_mut(pa).right = b;
        } else {
            self.get_mut(pa).left = b;
        }
        let b_is_right = self.get(pb).right == b;
        if b_is_right {
            self.get_mut(pb).right = a;
        } else {
            self.get_mut(pb).left = a;
        }
        let num_a = self.get(a).number;
        let num_b = self.get(b).number;
        self.number2node[num_a as usize] = b;
        self.number2node[num_b as usize] = a;
        self.get_mut(a).number = num_b;
        self.get_mut(b).number = num_a;
        self.get_mut(a).parent = pb;
        self.get_mut(b).parent = pa;
    }

    fn update_tree(&mut self, mut current: u16) {
        while current != 0 {
            let highest = self.highest_node(current);
            self.exchange(current, highest);
            self.get_mut(current).weight += 1;
            current = self.get(current).parent;
        }
    }

    /// Recomputes the code for an already-seen leaf and bumps its weight.
    fn encode_existing(&mut self, leaf: u16) -> (u64, u32) {
        let code = self.get_code(leaf);
        self.update_tree(leaf);
        code
    }

    #[cfg(any(test, debug_assertions))]
    fn is_valid(&self) -> bool {
        self.validate_node(self.root)
    }

    #[cfg(any(test, debug_assertions))]
    fn validate_node(&self, id: u16) -> bool {
        if id == 0 {
            return true;
        }
        let node = self.get(id);
        let has_left = node.left != 0;
        let has_right = node.right != 0;
        if has_left != has_right {
            return false;
        }
        if !has_left {
            return true;
        }
        let l = self.get(node.left);
        let r = self.get(node.right);
        l.parent == id
            && r.parent == id
            && node.number > r.number
            && r.number > l.number
            && self.validate_node(node.left)
            && self.validate_node(node.right)
    }
}

/// Byte-sink adapter that adaptive-Huffman-encodes each byte written to it
/// and writes the resulting bit code to its own inner [`BitStreamWriter`].
pub struct AdaptiveHuffmanWriter<S: ByteSink> {
    inner: BitStreamWriter<S>,
    tree: Tree,
}

impl<S: ByteSink> AdaptiveHuffmanWriter<S> {
    pub fn new(sink: S) -> Self {
        Self { inner: BitStreamWriter::new(sink), tree: Tree::new() }
    }

    pub fn good(&self) -> bool {
        self.inner.good()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> BitStreamWriter<S> {
        self.inner
    }

    fn encode(&mut self, byte: u8) -> io::Result<()> {
        let leaf = self.tree.byte2node[byte as usize];
        if leaf != 0 {
            let (code, size) = self.tree.encode_existing(leaf);
            self.inner.write_bits(code, size)?;
        } else {
            let (code, size) = self.tree.get_code(self.tree.null);
            self.inner.write_bits(code, size)?;
            self.inner.write_byte(byte)?;
            self.tree.add_new_byte(byte);
        }
        debug_assert!(self.tree.is_valid());
        Ok(())
    }
}

impl<S: ByteSink> ByteSink for AdaptiveHuffmanWriter<S> {
    fn put_byte(&mut self, byte: u8) -> io::Result<()> {
        self.encode(byte)
    }
    fn good(&self) -> bool {
        AdaptiveHuffmanWriter::good(self)
    }
}

/// Byte-source adapter that pulls bits from its own inner
/// [`BitStreamReader`] and adaptive-Huffman-decodes them one byte at a time.
pub struct AdaptiveHuffmanReader<S: ByteSource> {
    inner: BitStreamReader<S>,
    tree: Tree,
}

impl<S: ByteSource> AdaptiveHuffmanReader<S> {
    pub fn new(source: S) -> Self {
        Self { inner: BitStreamReader::new(source), tree: Tree::new() }
    }

    pub fn good(&self) -> bool {
        self.inner.good()
    }

    fn decode(&mut self) -> io::Result<Option<u8>> {
        let mut current = self.tree.root;
        loop {
            if current == self.tree.null {
                return match self.inner.read_byte()? {
                    Some(byte) => {
                        self.tree.add_new_byte(byte);
                        debug_assert!(self.tree.is_valid());
                        Ok(Some(byte))
                    }
                    None => Ok(None),
                };
            }
            if self.tree.is_leaf(current) {
                let byte = self.tree.get(current).byte;
                self.tree.update_tree(current);
                debug_assert!(self.tree.is_valid());
                return Ok(Some(byte));
            }
            let node = self.tree.get(current);
            match self.inner.read_bits(1)? {
                Some(1) => current = node.right,
                Some(_) => current = node.left,
                None => return Ok(None),
            }
        }
    }
}

impl<S: ByteSource> ByteSource for AdaptiveHuffmanReader<S> {
    fn get_byte(&mut self) -> io::Result<Option<u8>> {
        self.decode()
    }
    fn good(&self) -> bool {
        AdaptiveHuffmanReader::good(self)
    }
}
