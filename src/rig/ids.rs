use super::types::{ControlPoint, DenseId, PointId};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Maps caller ids to the dense, zero-based ids sent to the model.
///
/// Built once per request. Repeated caller ids are treated as the same
/// logical point and share the dense id of their first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierMap {
    forward: HashMap<PointId, DenseId>,
}

impl IdentifierMap {
    /// Rewrites every point's id to its dense id, in first-seen order.
    /// Duplicate points stay in the returned sequence.
    pub fn normalize(points: &[ControlPoint]) -> (Vec<ControlPoint>, Self) {
        let mut map = Self::default();
        let mut rewritten = Vec::with_capacity(points.len());

        for point in points {
            let next = map.forward.len();
            let dense = *map.forward.entry(point.id).or_insert(next);
            if dense != next {
                debug!("Duplicate control point id {} mapped to {}", point.id, dense);
            }
            rewritten.push(ControlPoint {
                id: dense as PointId,
                ..point.clone()
            });
        }

        (rewritten, map)
    }

    pub fn dense_id(&self, original: PointId) -> Option<DenseId> {
        self.forward.get(&original).copied()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Re-keys a frame by caller id. Points the model left out are dropped.
    pub fn restore<T: Clone>(&self, frame: &BTreeMap<DenseId, T>) -> BTreeMap<PointId, T> {
        self.forward
            .iter()
            .filter_map(|(original, dense)| {
                frame.get(dense).map(|value| (*original, value.clone()))
            })
            .collect()
    }

    pub fn restore_all<T: Clone>(
        &self,
        frames: &[BTreeMap<DenseId, T>],
    ) -> Vec<BTreeMap<PointId, T>> {
        frames.iter().map(|frame| self.restore(frame)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn point(id: PointId, role: &str) -> ControlPoint {
        ControlPoint {
            id,
            role: role.to_string(),
            position: [id as f64, 0.0, 0.0],
        }
    }

    #[test]
    fn test_normalize_assigns_dense_ids_in_first_seen_order() {
        let points = vec![point(42, "head"), point(7, "left arm"), point(-3, "right leg")];

        let (rewritten, map) = IdentifierMap::normalize(&points);

        let ids: Vec<PointId> = rewritten.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(map.dense_id(42), Some(0));
        assert_eq!(map.dense_id(7), Some(1));
        assert_eq!(map.dense_id(-3), Some(2));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_normalize_keeps_roles_and_positions() {
        let points = vec![point(9, "head")];
        let (rewritten, _) = IdentifierMap::normalize(&points);

        assert_eq!(rewritten[0].role, "head");
        assert_eq!(rewritten[0].position, [9.0, 0.0, 0.0]);
    }

    #[test]
    fn test_duplicate_ids_share_first_dense_id() {
        let points = vec![point(3, "head"), point(8, "arm"), point(3, "head again")];

        let (rewritten, map) = IdentifierMap::normalize(&points);

        let ids: Vec<PointId> = rewritten.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 0]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.dense_id(3), Some(0));
    }

    #[test]
    fn test_restore_uses_original_ids() {
        let points = vec![point(3, "head"), point(8, "arm"), point(3, "head again")];
        let (_, map) = IdentifierMap::normalize(&points);

        let frame: BTreeMap<DenseId, &str> = [(0, "nod"), (1, "wave")].into_iter().collect();
        let restored = map.restore(&frame);

        let expected: BTreeMap<PointId, &str> = [(3, "nod"), (8, "wave")].into_iter().collect();
        assert_eq!(restored, expected);
    }

    #[test]
    fn test_restore_drops_missing_and_unknown_ids() {
        let points = vec![point(10, "a"), point(20, "b"), point(30, "c")];
        let (_, map) = IdentifierMap::normalize(&points);

        // Model skipped dense id 1 and invented dense id 7.
        let frame: BTreeMap<DenseId, u8> = [(0, 1), (2, 3), (7, 9)].into_iter().collect();
        let restored = map.restore(&frame);

        let keys: Vec<PointId> = restored.keys().copied().collect();
        assert_eq!(keys, vec![10, 30]);
    }

    #[test]
    fn test_round_trip_restores_original_id_set() {
        let points = vec![point(100, "a"), point(5, "b"), point(100, "c"), point(64, "d")];
        let (rewritten, map) = IdentifierMap::normalize(&points);

        let frame: BTreeMap<DenseId, PointId> = rewritten
            .iter()
            .map(|p| (p.id as DenseId, p.id))
            .collect();
        let restored = map.restore(&frame);

        let original_ids: BTreeSet<PointId> = points.iter().map(|p| p.id).collect();
        let restored_ids: BTreeSet<PointId> = restored.keys().copied().collect();
        assert_eq!(restored_ids, original_ids);
    }

    #[test]
    fn test_restore_all_preserves_frame_order() {
        let (_, map) = IdentifierMap::normalize(&[point(5, "head")]);
        let frames: Vec<BTreeMap<DenseId, u32>> = (0..3)
            .map(|i| [(0, i)].into_iter().collect())
            .collect();

        let restored = map.restore_all(&frames);

        let values: Vec<u32> = restored.iter().map(|f| f[&5]).collect();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_input() {
        let (rewritten, map) = IdentifierMap::normalize(&[]);
        assert!(rewritten.is_empty());
        assert!(map.is_empty());
    }
}
