//! Word List
//!
//! Validated, uppercase, fixed-length word list shared by every game mode.
//! Validation happens once at construction; a `WordList` that exists is
//! always non-empty and uniform in length.

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Word list validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordListError {
    /// No words supplied.
    #[error("word list cannot be empty")]
    Empty,
    /// Entries of different lengths.
    #[error("all words must have length {expected}, found {word:?}")]
    MixedLength {
        /// Length of the first word.
        expected: usize,
        /// First offending word.
        word: String,
    },
    /// Entry containing anything other than A-Z.
    #[error("word {0:?} must contain only English letters")]
    InvalidWord(String),
}

/// Immutable list of uppercase words of equal length.
///
/// Cheap to clone: the words live behind an `Arc`.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Arc<[String]>,
    index: Arc<BTreeMap<String, usize>>,
    word_length: usize,
}

impl WordList {
    /// Normalize to uppercase and validate.
    pub fn new<I, S>(words: I) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_ascii_uppercase())
            .collect();

        let first = words.first().ok_or(WordListError::Empty)?;
        let word_length = first.len();

        for word in &words {
            if word.is_empty() || !word.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(WordListError::InvalidWord(word.clone()));
            }
            if word.len() != word_length {
                return Err(WordListError::MixedLength {
                    expected: word_length,
                    word: word.clone(),
                });
            }
        }

        // First occurrence wins for duplicates
        let mut index = BTreeMap::new();
        for (i, word) in words.iter().enumerate() {
            index.entry(word.clone()).or_insert(i);
        }

        Ok(Self {
            words: words.into(),
            index: Arc::new(index),
            word_length,
        })
    }

    /// Length shared by every word.
    #[inline]
    pub fn word_length(&self) -> usize {
        self.word_length
    }

    /// Number of words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false once constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word at position `i`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.words.get(i).map(String::as_str)
    }

    /// Position of an (already uppercase) word.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// All indices, in list order.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.words.len()).collect()
    }
}
