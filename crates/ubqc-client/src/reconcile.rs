//! Output index reconciliation.
//!
//! Outputs are declared in an arbitrary order but requested from the server
//! in ascending qubit order, so the i-th qubit to arrive belongs to the i-th
//! smallest declared output. [`OutputIndexMap`] collects arrivals by slot and
//! [`OutputIndexMap::finish`] freezes them into [`ReconciledOutputs`], which
//! answers lookups in either direction.
//!
//! ```text
//! declared:  [q3, q1]
//! request:   [q1, q3]
//! slot 0 ──→ q1
//! slot 1 ──→ q3
//! ```

use ubqc_ir::QubitId;

use crate::error::{ClientError, ClientResult};

/// Arrival slots for the output qubits of one run.
#[derive(Debug)]
pub struct OutputIndexMap<H> {
    declared: Vec<QubitId>,
    order: Vec<QubitId>,
    slots: Vec<Option<H>>,
}

impl<H> OutputIndexMap<H> {
    /// Create a map for the outputs in declaration order.
    pub fn new(declared: &[QubitId]) -> ClientResult<Self> {
        let mut order = declared.to_vec();
        order.sort_unstable();
        if let Some(pair) = order.windows(2).find(|w| w[0] == w[1]) {
            return Err(ClientError::reconciliation(format!(
                "output {} declared twice",
                pair[0]
            )));
        }

        Ok(Self {
            declared: declared.to_vec(),
            slots: order.iter().map(|_| None).collect(),
            order,
        })
    }

    /// Outputs in declaration order.
    pub fn declared(&self) -> &[QubitId] {
        &self.declared
    }

    /// Outputs in the order they are requested and arrive.
    pub fn request_order(&self) -> &[QubitId] {
        &self.order
    }

    /// Store the qubit that arrived in `slot`, returning its logical index.
    pub fn register(&mut self, slot: usize, handle: H) -> ClientResult<QubitId> {
        let count = self.slots.len();
        let entry = self.slots.get_mut(slot).ok_or_else(|| {
            ClientError::reconciliation(format!(
                "arrival slot {slot} out of range for {count} outputs"
            ))
        })?;
        if entry.is_some() {
            return Err(ClientError::reconciliation(format!(
                "arrival slot {slot} filled twice"
            )));
        }
        *entry = Some(handle);
        Ok(self.order[slot])
    }

    /// Number of slots filled so far.
    pub fn arrived(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Freeze the map once every output has arrived.
    pub fn finish(self) -> ClientResult<ReconciledOutputs<H>> {
        let mut handles = Vec::with_capacity(self.slots.len());
        for (slot, handle) in self.slots.into_iter().enumerate() {
            match handle {
                Some(h) => handles.push(h),
                None => {
                    return Err(ClientError::reconciliation(format!(
                        "output {} (slot {slot}) never arrived",
                        self.order[slot]
                    )));
                }
            }
        }

        Ok(ReconciledOutputs {
            order: self.order,
            handles,
        })
    }
}

/// Output qubits matched to their logical indices.
#[derive(Debug)]
pub struct ReconciledOutputs<H> {
    order: Vec<QubitId>,
    handles: Vec<H>,
}

impl<H> ReconciledOutputs<H> {
    /// Number of outputs.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether there are no outputs.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Arrival slot of the output with logical index `logical`.
    pub fn slot_of(&self, logical: QubitId) -> ClientResult<usize> {
        self.order.binary_search(&logical).map_err(|_| {
            ClientError::reconciliation(format!("{logical} is not a declared output"))
        })
    }

    /// Logical index of the output that arrived in `slot`.
    pub fn logical_of(&self, slot: usize) -> ClientResult<QubitId> {
        self.order.get(slot).copied().ok_or_else(|| {
            ClientError::reconciliation(format!(
                "arrival slot {slot} out of range for {} outputs",
                self.order.len()
            ))
        })
    }

    /// Handle of the output with logical index `logical`.
    pub fn handle(&self, logical: QubitId) -> ClientResult<&H> {
        let slot = self.slot_of(logical)?;
        Ok(&self.handles[slot])
    }

    /// Mutable handle of the output with logical index `logical`.
    pub fn handle_mut(&mut self, logical: QubitId) -> ClientResult<&mut H> {
        let slot = self.slot_of(logical)?;
        Ok(&mut self.handles[slot])
    }

    /// Iterate over `(logical, handle)` in ascending logical order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (QubitId, &mut H)> + '_ {
        self.order.iter().copied().zip(self.handles.iter_mut())
    }

    /// Take the handles in ascending logical order.
    pub fn into_handles(self) -> Vec<(QubitId, H)> {
        self.order.into_iter().zip(self.handles).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(ids: &[u32]) -> Vec<QubitId> {
        ids.iter().copied().map(QubitId).collect()
    }

    #[test]
    fn test_request_order_is_ascending() {
        let map: OutputIndexMap<&str> = OutputIndexMap::new(&q(&[7, 2, 5])).unwrap();
        assert_eq!(map.request_order(), q(&[2, 5, 7]).as_slice());
        assert_eq!(map.declared(), q(&[7, 2, 5]).as_slice());
    }

    #[test]
    fn test_reconcile_unsorted_declaration() {
        let mut map = OutputIndexMap::new(&q(&[3, 1])).unwrap();
        assert_eq!(map.register(0, "first").unwrap(), QubitId(1));
        assert_eq!(map.register(1, "second").unwrap(), QubitId(3));
        assert_eq!(map.arrived(), 2);

        let mut outputs = map.finish().unwrap();
        assert_eq!(*outputs.handle(QubitId(1)).unwrap(), "first");
        assert_eq!(*outputs.handle(QubitId(3)).unwrap(), "second");
        assert_eq!(outputs.slot_of(QubitId(3)).unwrap(), 1);
        assert_eq!(outputs.logical_of(0).unwrap(), QubitId(1));

        *outputs.handle_mut(QubitId(3)).unwrap() = "patched";
        assert_eq!(
            outputs.into_handles(),
            vec![(QubitId(1), "first"), (QubitId(3), "patched")]
        );
    }

    #[test]
    fn test_slot_filled_twice() {
        let mut map = OutputIndexMap::new(&q(&[0, 1])).unwrap();
        map.register(0, 10).unwrap();
        assert!(matches!(
            map.register(0, 11),
            Err(ClientError::IndexReconciliation(msg)) if msg.contains("twice")
        ));
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut map = OutputIndexMap::new(&q(&[4])).unwrap();
        assert!(map.register(1, ()).is_err());
    }

    #[test]
    fn test_missing_arrival() {
        let mut map = OutputIndexMap::new(&q(&[0, 2])).unwrap();
        map.register(1, 'b').unwrap();
        match map.finish() {
            Err(ClientError::IndexReconciliation(msg)) => assert!(msg.contains("q0")),
            other => panic!("expected reconciliation error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_declaration() {
        assert!(OutputIndexMap::<()>::new(&q(&[2, 2])).is_err());
    }

    #[test]
    fn test_undeclared_lookup() {
        let mut map = OutputIndexMap::new(&q(&[1])).unwrap();
        map.register(0, ()).unwrap();
        let outputs = map.finish().unwrap();
        assert!(outputs.handle(QubitId(0)).is_err());
        assert!(outputs.logical_of(1).is_err());
    }

    #[test]
    fn test_empty_outputs() {
        let map: OutputIndexMap<()> = OutputIndexMap::new(&[]).unwrap();
        let outputs = map.finish().unwrap();
        assert!(outputs.is_empty());
        assert!(outputs.into_handles().is_empty());
    }
}
