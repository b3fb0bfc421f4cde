//! Merges batches whose headers agree on everything but the batch number.

use crate::batch::Batch;
use crate::error::Result;
use crate::file::File;
use crate::iat_batch::IatBatch;
use crate::records::{TraceNumbered, TRACE_SEQUENCE_MODULUS};
use log::debug;
use std::collections::HashMap;

/// What to do when an entry's trace number is not above the last trace
/// number of the batch it is being merged into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlattenStrategy {
    /// Give the entry the next sequence after the batch's last trace number.
    #[default]
    Renumber,

    /// Start a new output batch for the header at the colliding entry,
    /// leaving every trace number untouched.
    SplitOnCollision,
}

/// One output batch under construction. Trace numbers only ever ascend.
struct Group<E> {
    /// Index of the source batch whose header the group uses.
    source: usize,
    entries: Vec<E>,
    last_trace: Option<u64>,
}

impl<E: TraceNumbered> Group<E> {
    fn new(source: usize) -> Self {
        Group {
            source,
            entries: Vec::new(),
            last_trace: None,
        }
    }

    fn accepts(&self, trace: u64) -> bool {
        self.last_trace.map_or(true, |last| trace > last)
    }

    /// Trace number following the last one, unless the sequence is exhausted.
    fn next_trace(&self) -> Option<u64> {
        let next = self.last_trace? + 1;
        (next % TRACE_SEQUENCE_MODULUS != 0).then_some(next)
    }

    fn push(&mut self, entry: E) {
        self.last_trace = Some(entry.trace_number());
        self.entries.push(entry);
    }
}

/// Groups entries by merge key, in order of first appearance.
fn merge<'a, E, I>(sources: I, strategy: FlattenStrategy) -> Vec<Group<E>>
where
    E: TraceNumbered + Clone + 'a,
    I: IntoIterator<Item = (String, &'a [E])>,
{
    let mut groups: Vec<Group<E>> = Vec::new();
    let mut open: HashMap<String, usize> = HashMap::new();

    for (source, (key, entries)) in sources.into_iter().enumerate() {
        for entry in entries {
            let trace = entry.trace_number();
            let index = match open.get(&key) {
                Some(&index) => index,
                None => {
                    groups.push(Group::new(source));
                    open.insert(key.clone(), groups.len() - 1);
                    groups.len() - 1
                }
            };
            if groups[index].accepts(trace) {
                groups[index].push(entry.clone());
                continue;
            }
            let renumbered = match strategy {
                FlattenStrategy::Renumber => groups[index].next_trace(),
                FlattenStrategy::SplitOnCollision => None,
            };
            match renumbered {
                Some(renumbered) => {
                    debug!("flatten: trace {} out of order, renumbered to {}", trace, renumbered);
                    let mut entry = entry.clone();
                    entry.set_trace_number(renumbered);
                    groups[index].push(entry);
                }
                None => {
                    debug!("flatten: trace {} out of order, starting a new batch", trace);
                    let mut group = Group::new(source);
                    group.push(entry.clone());
                    groups.push(group);
                    open.insert(key.clone(), groups.len() - 1);
                }
            }
        }
    }
    groups
}

impl File {
    /// Merges compatible batches, renumbering trace numbers that would
    /// otherwise collide or descend.
    pub fn flatten(&self) -> Result<File> {
        self.flatten_with(FlattenStrategy::Renumber)
    }

    /// Merges batches sharing a header (batch number aside) into as few
    /// batches as the strategy allows, then renumbers batches from 1.
    ///
    /// Entries keep their original file order within each merged batch.
    /// ADV batches are carried over unmerged after the merged batches.
    pub fn flatten_with(&self, strategy: FlattenStrategy) -> Result<File> {
        let standard: Vec<&Batch> = self.batches().iter().filter(|b| !b.is_adv()).collect();
        let groups = merge(
            standard
                .iter()
                .map(|b| (b.header().merge_key(), b.entries())),
            strategy,
        );

        let mut flat = File::new(self.header().clone());
        let mut batch_number = 0;
        for group in groups {
            batch_number += 1;
            let mut header = standard[group.source].header().clone();
            header.batch_number = batch_number;
            let mut batch = Batch::new(header)?;
            for entry in group.entries {
                batch.add_entry(entry);
            }
            batch.compute_control();
            flat.add_batch(batch);
        }
        for adv in self.batches().iter().filter(|b| b.is_adv()) {
            batch_number += 1;
            let mut batch = adv.clone();
            batch.header_mut().batch_number = batch_number;
            batch.compute_control();
            flat.add_batch(batch);
        }

        let iat = self.iat_batches();
        let groups = merge(
            iat.iter().map(|b| (b.header().merge_key(), b.entries())),
            strategy,
        );
        for group in groups {
            batch_number += 1;
            let mut header = iat[group.source].header().clone();
            header.batch_number = batch_number;
            let mut batch = IatBatch::new(header)?;
            for entry in group.entries {
                batch.add_entry(entry);
            }
            batch.compute_control();
            flat.add_iat_batch(batch);
        }

        debug!(
            "flatten: {} batches merged into {}",
            self.batches().len() + self.iat_batches().len(),
            batch_number
        );
        flat.build()?;
        Ok(flat)
    }
}
