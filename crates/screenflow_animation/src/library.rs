// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named sequence collections loaded from RON.
//!
//! Authored sequences refer to their chain target by name. Loading resolves
//! those names into `Arc` links, rejecting unknown targets and cycles, so a
//! loaded library can never chain forever.

use crate::error::{Result, SequenceError};
use crate::sequence::Sequence;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// On-disk layout of a sequence library
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceLibraryFile {
    /// Authored sequences
    pub sequences: Vec<Sequence>,
}

/// Resolved, immutable sequences addressed by name
#[derive(Debug, Clone, Default)]
pub struct SequenceLibrary {
    sequences: IndexMap<String, Arc<Sequence>>,
}

impl SequenceLibrary {
    /// Resolve authored sequences into a library
    pub fn from_sequences(authored: Vec<Sequence>) -> Result<Self> {
        let mut by_name: IndexMap<String, Sequence> = IndexMap::new();
        for sequence in authored {
            if sequence.is_empty() {
                tracing::warn!("Sequence '{}' has no steps and will not play", sequence.name);
            }
            let name = sequence.name.clone();
            if by_name.insert(name.clone(), sequence).is_some() {
                return Err(SequenceError::DuplicateName(name));
            }
        }

        let mut resolved = IndexMap::new();
        let names: Vec<String> = by_name.keys().cloned().collect();
        for name in names {
            let mut visiting = Vec::new();
            resolve(&name, &by_name, &mut resolved, &mut visiting)?;
        }

        // Keep authoring order rather than resolution order
        let sequences = by_name
            .keys()
            .filter_map(|name| resolved.get(name).map(|seq| (name.clone(), Arc::clone(seq))))
            .collect();
        Ok(Self { sequences })
    }

    /// Parse a library from RON text
    pub fn from_ron(source: &str) -> Result<Self> {
        let file: SequenceLibraryFile = ron::from_str(source)?;
        Self::from_sequences(file.sequences)
    }

    /// Load a library from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let library = Self::from_ron(&content)?;
        tracing::info!("Loaded {} sequences from {:?}", library.len(), path);
        Ok(library)
    }

    /// Get a sequence by name
    pub fn get(&self, name: &str) -> Option<Arc<Sequence>> {
        self.sequences.get(name).cloned()
    }

    /// Get all sequences in authoring order
    pub fn sequences(&self) -> impl Iterator<Item = &Arc<Sequence>> {
        self.sequences.values()
    }

    /// Get sequence count
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the library holds no sequences
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Depth-first resolution; `visiting` is the current chain path.
fn resolve(
    name: &str,
    authored: &IndexMap<String, Sequence>,
    resolved: &mut IndexMap<String, Arc<Sequence>>,
    visiting: &mut Vec<String>,
) -> Result<Arc<Sequence>> {
    if let Some(done) = resolved.get(name) {
        return Ok(Arc::clone(done));
    }
    if let Some(start) = visiting.iter().position(|n| n == name) {
        let mut cycle = visiting[start..].to_vec();
        cycle.push(name.to_string());
        return Err(SequenceError::ChainCycle(cycle));
    }

    // Callers only pass names that exist in `authored`
    let Some(sequence) = authored.get(name) else {
        return Err(SequenceError::UnknownChain {
            sequence: visiting.last().cloned().unwrap_or_default(),
            chain: name.to_string(),
        });
    };

    visiting.push(name.to_string());
    let sequence = match sequence.chain.as_deref() {
        Some(chain) => {
            if !authored.contains_key(chain) {
                return Err(SequenceError::UnknownChain {
                    sequence: name.to_string(),
                    chain: chain.to_string(),
                });
            }
            let next = resolve(chain, authored, resolved, visiting)?;
            sequence.clone().chain_to(next)
        }
        None => sequence.clone(),
    };
    visiting.pop();

    let sequence = Arc::new(sequence);
    resolved.insert(name.to_string(), Arc::clone(&sequence));
    Ok(sequence)
}
