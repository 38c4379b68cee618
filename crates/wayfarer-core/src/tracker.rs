//! User edits layered on the assembled plan: checklist and packing flags,
//! the selected flight, and whether the composite state has unsaved changes.

use crate::error::PlannerError;
use crate::model::{Flight, Plan};

/// Flip `completed` on checklist item `index`. Returns the new value.
pub fn toggle_checklist(plan: &mut Plan, index: usize) -> Result<bool, PlannerError> {
    let item = plan
        .checklist
        .get_mut(index)
        .ok_or_else(|| PlannerError::NoSuchItem(format!("checklist item {index}")))?;
    item.completed = !item.completed;
    Ok(item.completed)
}

/// Flip `packed` on item `item` of packing category `category`. Returns the
/// new value.
pub fn toggle_packing(plan: &mut Plan, category: usize, item: usize) -> Result<bool, PlannerError> {
    let entry = plan
        .packing_list
        .get_mut(category)
        .and_then(|c| c.items.get_mut(item))
        .ok_or_else(|| {
            PlannerError::NoSuchItem(format!("packing item {item} in category {category}"))
        })?;
    entry.packed = !entry.packed;
    Ok(entry.packed)
}

/// Check that a toggle target exists without touching the plan.
pub fn checklist_index_valid(plan: &Plan, index: usize) -> bool {
    index < plan.checklist.len()
}

pub fn packing_index_valid(plan: &Plan, category: usize, item: usize) -> bool {
    plan.packing_list
        .get(category)
        .is_some_and(|c| item < c.items.len())
}

/// Selection and saved-state bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct InteractionTracker {
    selection: Option<Flight>,
    saved: bool,
}

impl InteractionTracker {
    /// A fresh tracker for a plan that has never been saved.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker for state just restored from the store.
    pub fn restored(selection: Option<Flight>) -> Self {
        Self {
            selection,
            saved: true,
        }
    }

    pub fn selection(&self) -> Option<&Flight> {
        self.selection.as_ref()
    }

    /// Select `flight`, or clear the selection if it is already selected.
    ///
    /// Returns the selection after the change.
    pub fn select_flight(&mut self, flight: &Flight) -> Option<&Flight> {
        if self.selection.as_ref() == Some(flight) {
            self.selection = None;
        } else {
            self.selection = Some(flight.clone());
        }
        self.saved = false;
        self.selection.as_ref()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Record an edit to the plan; the state now differs from the store.
    pub fn mark_dirty(&mut self) {
        self.saved = false;
    }

    pub fn mark_saved(&mut self) {
        self.saved = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChecklistItem, Costs, PackingCategory, PackingItem};

    fn plan() -> Plan {
        Plan {
            itinerary: vec![],
            costs: Costs {
                accommodation: 0.0,
                food: 0.0,
                activities: 0.0,
                transport: 0.0,
                total: 0.0,
            },
            checklist: ["Passport", "Visa", "Insurance"]
                .iter()
                .map(|t| ChecklistItem {
                    task: t.to_string(),
                    details: String::new(),
                    completed: false,
                })
                .collect(),
            packing_list: vec![PackingCategory {
                category: "Clothes".to_owned(),
                items: vec![
                    PackingItem {
                        item: "Socks".to_owned(),
                        quantity: 3,
                        packed: false,
                    },
                    PackingItem {
                        item: "Hat".to_owned(),
                        quantity: 1,
                        packed: false,
                    },
                ],
            }],
            flights: vec![],
            locations: vec![],
            weather: vec![],
        }
    }

    fn flight(airline: &str) -> Flight {
        Flight {
            airline: airline.to_owned(),
            stops: 0,
            price: 100.0,
            cabin_class: "Y".to_owned(),
        }
    }

    #[test]
    fn toggle_checklist_twice_restores_and_leaves_others() {
        let mut p = plan();
        let before = p.clone();
        assert!(toggle_checklist(&mut p, 1).unwrap());
        assert!(p.checklist[1].completed);
        assert!(!p.checklist[0].completed && !p.checklist[2].completed);
        assert!(!toggle_checklist(&mut p, 1).unwrap());
        assert_eq!(p, before);
    }

    #[test]
    fn toggle_packing_targets_one_item() {
        let mut p = plan();
        assert!(toggle_packing(&mut p, 0, 1).unwrap());
        assert!(!p.packing_list[0].items[0].packed);
        assert!(p.packing_list[0].items[1].packed);
    }

    #[test]
    fn out_of_range_toggles_are_errors() {
        let mut p = plan();
        let before = p.clone();
        assert!(matches!(
            toggle_checklist(&mut p, 3),
            Err(PlannerError::NoSuchItem(_))
        ));
        assert!(toggle_packing(&mut p, 1, 0).is_err());
        assert!(toggle_packing(&mut p, 0, 2).is_err());
        assert_eq!(p, before);
        assert!(!checklist_index_valid(&p, 3));
        assert!(packing_index_valid(&p, 0, 1));
        assert!(!packing_index_valid(&p, 0, 2));
    }

    #[test]
    fn selecting_same_flight_twice_clears() {
        let mut tracker = InteractionTracker::new();
        let a = flight("A");
        assert_eq!(tracker.select_flight(&a), Some(&a));
        assert_eq!(tracker.select_flight(&a.clone()), None);
    }

    #[test]
    fn selecting_other_flight_replaces() {
        let mut tracker = InteractionTracker::new();
        tracker.select_flight(&flight("A"));
        let b = flight("B");
        assert_eq!(tracker.select_flight(&b), Some(&b));
    }

    #[test]
    fn any_change_clears_saved_flag() {
        let mut tracker = InteractionTracker::restored(None);
        assert!(tracker.is_saved());
        tracker.select_flight(&flight("A"));
        assert!(!tracker.is_saved());
        tracker.mark_saved();
        tracker.mark_dirty();
        assert!(!tracker.is_saved());
    }
}
