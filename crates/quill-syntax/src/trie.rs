#![forbid(unsafe_code)]

//! Prefix tree over code points for keyword recognition.
//!
//! Nodes live in an arena and refer to each other by index. Each node keeps
//! the index of its parent so removal can prune upward without back
//! pointers. Freed slots are recycled by later insertions.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct Node {
    children: FxHashMap<char, usize>,
    parent: Option<usize>,
    key: char,
    end_of_word: bool,
}

impl Node {
    fn child_of(parent: usize, key: char) -> Self {
        Self {
            children: FxHashMap::default(),
            parent: Some(parent),
            key,
            end_of_word: false,
        }
    }

    fn is_prunable(&self) -> bool {
        !self.end_of_word && self.children.is_empty()
    }
}

/// Single-code-point completions returned by [`LexicalIndex::suggestion`].
pub type Suggestions = SmallVec<[char; 8]>;

/// Arena-backed keyword trie.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    nodes: Vec<Node>,
    free: Vec<usize>,
    words: usize,
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalIndex {
    /// Create an empty index holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            free: Vec::new(),
            words: 0,
        }
    }

    /// Insert `word`. Returns `false` if it was already present.
    ///
    /// The empty word is ignored.
    pub fn put(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut cur = ROOT;
        for ch in word.chars() {
            cur = match self.nodes[cur].children.get(&ch) {
                Some(&next) => next,
                None => self.alloc(cur, ch),
            };
        }
        let node = &mut self.nodes[cur];
        if node.end_of_word {
            return false;
        }
        node.end_of_word = true;
        self.words += 1;
        true
    }

    /// Exact membership.
    #[must_use]
    pub fn matches(&self, word: &str) -> bool {
        self.find(word).is_some_and(|idx| self.nodes[idx].end_of_word)
    }

    /// Whether some path spells `prefix`, terminal or not.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.find(prefix).is_some()
    }

    /// Remove `word`, pruning ancestors left with no children and no
    /// terminal flag.
    ///
    /// Returns `false` (and changes nothing) if the word was absent.
    pub fn remove(&mut self, word: &str) -> bool {
        let Some(idx) = self.find(word).filter(|&i| self.nodes[i].end_of_word) else {
            return false;
        };
        if idx == ROOT {
            return false;
        }
        self.nodes[idx].end_of_word = false;
        self.words -= 1;

        let mut cur = idx;
        while cur != ROOT && self.nodes[cur].is_prunable() {
            let Some(parent) = self.nodes[cur].parent else {
                break;
            };
            let key = self.nodes[cur].key;
            self.nodes[parent].children.remove(&key);
            self.release(cur);
            cur = parent;
        }
        true
    }

    /// Immediate child keys after walking as far as `prefix` matches.
    ///
    /// This is shallow: only single-code-point continuations are returned,
    /// sorted ascending.
    #[must_use]
    pub fn suggestion(&self, prefix: &str) -> Suggestions {
        let mut cur = ROOT;
        for ch in prefix.chars() {
            match self.nodes[cur].children.get(&ch) {
                Some(&next) => cur = next,
                None => break,
            }
        }
        let mut keys: Suggestions = self.nodes[cur].children.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Length in UTF-16 units of the longest word starting at `pos`.
    #[must_use]
    pub fn match_at(&self, units: &[u16], pos: usize) -> Option<usize> {
        let tail = units.get(pos..)?;
        let mut cur = ROOT;
        let mut consumed = 0;
        let mut best = None;
        for decoded in char::decode_utf16(tail.iter().copied()) {
            let Ok(ch) = decoded else {
                break;
            };
            let Some(&next) = self.nodes[cur].children.get(&ch) else {
                break;
            };
            cur = next;
            consumed += ch.len_utf16();
            if self.nodes[cur].end_of_word {
                best = Some(consumed);
            }
        }
        best
    }

    /// Number of stored words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Live nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn find(&self, word: &str) -> Option<usize> {
        let mut cur = ROOT;
        for ch in word.chars() {
            cur = *self.nodes[cur].children.get(&ch)?;
        }
        Some(cur)
    }

    fn alloc(&mut self, parent: usize, key: char) -> usize {
        let node = Node::child_of(parent, key);
        let idx = if let Some(idx) = self.free.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        };
        self.nodes[parent].children.insert(key, idx);
        idx
    }

    fn release(&mut self, idx: usize) {
        self.nodes[idx] = Node::default();
        self.free.push(idx);
    }
}

impl<'a> Extend<&'a str> for LexicalIndex {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        for word in iter {
            self.put(word);
        }
    }
}

impl<'a> FromIterator<&'a str> for LexicalIndex {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}
