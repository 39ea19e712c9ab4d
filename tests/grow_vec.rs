// GrowVec integration tests.
//
// The array is a passive store of handles: bounds-checked access, doubling
// growth that preserves indices, and no ownership of what handles refer to.
use chained_hash::vector::DEFAULT_CAPACITY;
use chained_hash::{GrowVec, VecError};
use std::rc::Rc;

#[test]
fn default_capacity_and_doubling() {
    let mut v = GrowVec::new_default().unwrap();
    assert_eq!(v.capacity(), DEFAULT_CAPACITY);
    for i in 0..=DEFAULT_CAPACITY {
        v.append(i).unwrap();
    }
    assert_eq!(v.len(), DEFAULT_CAPACITY + 1);
    assert_eq!(v.capacity(), DEFAULT_CAPACITY * 2);
    assert_eq!(v.get(DEFAULT_CAPACITY), Ok(&DEFAULT_CAPACITY));
}

#[test]
fn out_of_bounds_is_an_error_not_an_abort() {
    let mut v: GrowVec<&str> = GrowVec::new(1).unwrap();
    v.append("x").unwrap();
    let err = v.get(5).unwrap_err();
    assert_eq!(err, VecError::OutOfBounds { index: 5, len: 1 });
    assert_eq!(
        err.to_string(),
        "index 5 out of bounds for growable array of length 1"
    );
    assert!(v.set(1, "y").is_err());
    assert_eq!(v.get(0), Ok(&"x"));
}

// Test: handles are stored, not owned.
// Verifies: dropping the array releases only its own storage; the pointees
// stay alive with their other owners.
#[test]
fn dropping_array_leaves_pointees_alone() {
    let shared: Vec<Rc<String>> = (0..4).map(|i| Rc::new(format!("n{i}"))).collect();
    let mut v = GrowVec::new(2).unwrap();
    for rc in &shared {
        v.append(Rc::clone(rc)).unwrap();
    }
    assert!(shared.iter().all(|rc| Rc::strong_count(rc) == 2));
    drop(v);
    assert!(shared.iter().all(|rc| Rc::strong_count(rc) == 1));
}
