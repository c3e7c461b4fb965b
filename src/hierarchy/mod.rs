//! Ordering and activation rules shared by projects, pages and tabs.
//!
//! Every function here works on one sibling set already loaded from the
//! store (ordered by `display_order`) and mutates it in place. The returned
//! indices name the siblings whose order or active flag changed, which are
//! the only rows the caller has to write back.

use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::models::{Page, Project, Tab};

/// An element of a sibling set
pub trait Ordered {
    fn id(&self) -> Uuid;
    fn display_order(&self) -> i32;
    fn set_display_order(&mut self, order: i32);
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
}

macro_rules! impl_ordered {
    ($($entity:ty),*) => {
        $(
            impl Ordered for $entity {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn display_order(&self) -> i32 {
                    self.display_order
                }

                fn set_display_order(&mut self, order: i32) {
                    self.display_order = order;
                    self.updated_at = Utc::now();
                }

                fn is_active(&self) -> bool {
                    self.is_active
                }

                fn set_active(&mut self, active: bool) {
                    self.is_active = active;
                    self.updated_at = Utc::now();
                }
            }
        )*
    };
}

impl_ordered!(Project, Page, Tab);

/// Why a requested order could not be applied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("id {0} is not part of this sibling set")]
    UnknownId(Uuid),
    #[error("id {0} appears more than once")]
    DuplicateId(Uuid),
    #[error("expected {expected} ids, got {actual}")]
    Incomplete { expected: usize, actual: usize },
}

/// Order for an element appended after every existing sibling
pub fn append_order(max_order: Option<i32>) -> i32 {
    max_order.map_or(0, |max| max + 1)
}

/// Where a new element lands and which existing siblings moved to make room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub order: i32,
    pub shifted: Vec<usize>,
}

/// Make room for a new element at `position`.
///
/// Positions in `0..=len` shift every sibling at or after it up by one.
/// `None`, negative and out-of-range positions append at the end.
pub fn insert_at<T: Ordered>(siblings: &mut [T], position: Option<i32>) -> Placement {
    let len = siblings.len() as i32;
    let target = match position {
        Some(p) if (0..=len).contains(&p) => p,
        _ => {
            let max = siblings.iter().map(Ordered::display_order).max();
            return Placement { order: append_order(max), shifted: Vec::new() };
        }
    };

    let mut shifted = Vec::new();
    for (index, sibling) in siblings.iter_mut().enumerate() {
        if sibling.display_order() >= target {
            sibling.set_display_order(sibling.display_order() + 1);
            shifted.push(index);
        }
    }
    Placement { order: target, shifted }
}

/// Renumber siblings to `0..len` keeping their relative order.
///
/// Used after a removal so the gap left behind is closed.
pub fn compact<T: Ordered>(siblings: &mut [T]) -> Vec<usize> {
    siblings.sort_by_key(Ordered::display_order);
    let mut changed = Vec::new();
    for (index, sibling) in siblings.iter_mut().enumerate() {
        let order = index as i32;
        if sibling.display_order() != order {
            sibling.set_display_order(order);
            changed.push(index);
        }
    }
    changed
}

/// Assign `order = position in ids` to every sibling.
///
/// `ids` must be a permutation of the whole sibling set.
pub fn apply_order<T: Ordered>(siblings: &mut [T], ids: &[Uuid]) -> Result<Vec<usize>, OrderError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !siblings.iter().any(|s| s.id() == *id) {
            return Err(OrderError::UnknownId(*id));
        }
        if !seen.insert(*id) {
            return Err(OrderError::DuplicateId(*id));
        }
    }
    if ids.len() != siblings.len() {
        return Err(OrderError::Incomplete { expected: siblings.len(), actual: ids.len() });
    }

    let mut changed = Vec::new();
    for (index, sibling) in siblings.iter_mut().enumerate() {
        let order = ids.iter().position(|id| *id == sibling.id()).unwrap_or(index) as i32;
        if sibling.display_order() != order {
            sibling.set_display_order(order);
            changed.push(index);
        }
    }
    Ok(changed)
}

/// Make `target` the only active sibling
pub fn activate<T: Ordered>(siblings: &mut [T], target: Uuid) -> Vec<usize> {
    let mut changed = Vec::new();
    for (index, sibling) in siblings.iter_mut().enumerate() {
        let should_be_active = sibling.id() == target;
        if sibling.is_active() != should_be_active {
            sibling.set_active(should_be_active);
            changed.push(index);
        }
    }
    changed
}

/// Clear every active flag, returning the indices that were active
pub fn deactivate_all<T: Ordered>(siblings: &mut [T]) -> Vec<usize> {
    let mut changed = Vec::new();
    for (index, sibling) in siblings.iter_mut().enumerate() {
        if sibling.is_active() {
            sibling.set_active(false);
            changed.push(index);
        }
    }
    changed
}

/// True when the orders are exactly `0..len`
pub fn is_dense<T: Ordered>(siblings: &[T]) -> bool {
    let mut orders: Vec<i32> = siblings.iter().map(Ordered::display_order).collect();
    orders.sort_unstable();
    orders.iter().enumerate().all(|(index, order)| *order == index as i32)
}
