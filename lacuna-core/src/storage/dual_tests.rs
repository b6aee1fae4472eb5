//==================================================================================
// Unit Tests for the dual-array layout
//==================================================================================

#[cfg(test)]
mod tests {
    use crate::error::LacunaError;
    use crate::slot::Slot;
    use crate::storage::dual::DualArray;
    use crate::storage::tags::{MISSING_TAG, VALUE_TAG};

    fn sample() -> DualArray<i64> {
        DualArray::from_slots(vec![Slot::Value(1), Slot::Missing, Slot::Value(2)])
    }

    #[test]
    fn test_get_reads_tag_first() {
        let arr = sample();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(0).unwrap(), Slot::Value(1));
        assert_eq!(arr.get(1).unwrap(), Slot::Missing);
        assert_eq!(arr.get(2).unwrap(), Slot::Value(2));
        assert_eq!(arr.tags(), &[VALUE_TAG, MISSING_TAG, VALUE_TAG]);
    }

    #[test]
    fn test_get_and_set_out_of_range() {
        let mut arr = sample();
        assert!(matches!(
            arr.get(3),
            Err(LacunaError::OutOfRange { index: 3, len: 3, .. })
        ));
        assert!(matches!(
            arr.set(10, Slot::Value(5)),
            Err(LacunaError::OutOfRange { index: 10, .. })
        ));
        assert!(arr.is_missing(3).is_err());
    }

    #[test]
    fn test_set_missing_then_value() {
        let mut arr = DualArray::new(2, Slot::Value(7u16));
        arr.set(0, Slot::Missing).unwrap();
        assert!(arr.is_missing(0).unwrap());
        assert_eq!(arr.missing_count(), 1);

        arr.set(0, Slot::Value(9)).unwrap();
        assert_eq!(arr.get(0).unwrap(), Slot::Value(9));
        assert!(!arr.has_missing());
    }

    #[test]
    fn test_constructors() {
        let missing = DualArray::<f32>::all_missing(4);
        assert_eq!(missing.missing_count(), 4);
        assert!(missing.iter().all(|s| s.is_missing()));

        let present = DualArray::new(3, Slot::Value(0.5f64));
        assert_eq!(present.narrow(), Some(vec![0.5, 0.5, 0.5]));

        let from_opts: DualArray<i32> = vec![Some(1), None].into_iter().collect();
        assert_eq!(from_opts.get(1).unwrap(), Slot::Missing);
    }

    #[test]
    fn test_resize_keeps_pairs_and_fills_new_slots() {
        let mut arr = sample();
        arr.resize(5, Slot::Value(42));
        assert_eq!(arr.len(), 5);
        assert_eq!(arr.get(1).unwrap(), Slot::Missing);
        assert_eq!(arr.get(4).unwrap(), Slot::Value(42));

        arr.resize(6, Slot::Missing);
        assert_eq!(arr.get(5).unwrap(), Slot::Missing);

        arr.resize(2, Slot::Missing);
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.tags().len(), 2);
        assert_eq!(arr.footprint().value_bytes, 2 * 8);
    }

    #[test]
    fn test_narrow_inspects_actual_tags() {
        let mut arr = sample();
        assert_eq!(arr.narrow(), None);

        // Statically missing-capable, but currently holding none.
        arr.set(1, Slot::Value(5)).unwrap();
        assert_eq!(arr.narrow(), Some(vec![1, 5, 2]));
        assert_eq!(arr.into_narrow().unwrap(), vec![1, 5, 2]);
    }

    #[test]
    fn test_into_narrow_returns_array_when_missing() {
        let arr = sample();
        let back = arr.into_narrow().unwrap_err();
        assert_eq!(back.missing_count(), 1);
    }

    #[test]
    fn test_footprint_overhead_for_eight_byte_type() {
        let arr = DualArray::new(1000, Slot::Value(1.0f64));
        let fp = arr.footprint();
        assert_eq!(fp.value_bytes, 8000);
        assert_eq!(fp.tag_bytes, 1000);
        assert_eq!(fp.total(), 9000);
        assert!((fp.overhead_ratio() - 0.125).abs() < f64::EPSILON);
    }

    #[test]
    fn test_narrowed_buffer_matches_plain_array_layout() {
        let plain: Vec<u32> = vec![10, 20, 30];
        let arr = DualArray::from_values(plain.clone());
        assert_eq!(arr.values_as_bytes(), bytemuck::cast_slice::<u32, u8>(&plain));

        let narrowed = arr.narrow().unwrap();
        assert_eq!(
            narrowed.len() * std::mem::size_of::<u32>(),
            std::mem::size_of_val(plain.as_slice())
        );
    }

    #[test]
    fn test_iter_is_double_ended_and_exact() {
        let arr = sample();
        let mut it = arr.iter();
        assert_eq!(it.len(), 3);
        assert_eq!(it.next_back(), Some(Slot::Value(2)));
        assert_eq!(it.next(), Some(Slot::Value(1)));
        assert_eq!(it.next(), Some(Slot::Missing));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_user_defined_bits_type() {
        #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Zeroable)]
        struct Point {
            x: f32,
            y: f32,
        }

        let mut arr = DualArray::all_missing(2);
        arr.set(1, Slot::Value(Point { x: 1.0, y: -1.0 })).unwrap();
        assert_eq!(arr.get(0).unwrap(), Slot::Missing);
        assert_eq!(arr.get(1).unwrap(), Slot::Value(Point { x: 1.0, y: -1.0 }));
        assert_eq!(arr.footprint().value_bytes, 2 * std::mem::size_of::<Point>());
    }

    #[test]
    fn test_structural_equality_ignores_garbage_bits() {
        let mut a = DualArray::from_values(vec![1u8, 2]);
        let b = DualArray::from_slots(vec![Slot::Value(1u8), Slot::Missing]);
        assert_ne!(a, b);
        // Slot 1 of `a` keeps its stale bits after being marked missing.
        a.set(1, Slot::Missing).unwrap();
        assert_eq!(a, b);
    }
}
