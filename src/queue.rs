extern crate alloc;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::vbox::VBox;

/// Three-way comparator; the greatest element under it is popped first.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// A lazily sorted priority queue with a replaceable comparator.
///
/// Pushes only mark the contents unsorted; sorting happens on the next
/// [`peek`](Self::peek) or [`pop`](Self::pop). Replacing the comparator keeps
/// every queued element.
pub struct PriorityQueue<T> {
    contents: Vec<T>,
    sorted: bool,
    comparator: Comparator<T>,
}

impl<T> PriorityQueue<T> {
    pub fn new(comparator: Comparator<T>) -> Self {
        Self {
            contents: Vec::new(),
            sorted: true,
            comparator,
        }
    }

    pub fn push(&mut self, item: T) {
        self.contents.push(item);
        self.sorted = false;
    }

    /// The greatest element, if any.
    pub fn peek(&mut self) -> Option<&T> {
        self.sort();
        self.contents.last()
    }

    /// Remove and return the greatest element.
    pub fn pop(&mut self) -> Option<T> {
        self.sort();
        self.contents.pop()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn set_comparator(&mut self, comparator: Comparator<T>) {
        self.comparator = comparator;
        self.sorted = false;
    }

    /// All elements, ascending under the current comparator.
    pub fn sorted(&mut self) -> &[T] {
        self.sort();
        &self.contents
    }

    /// Map over the elements in ascending order.
    pub fn map<U>(&mut self, f: impl FnMut(&T) -> U) -> Vec<U> {
        self.sorted().iter().map(f).collect()
    }

    fn sort(&mut self) {
        if !self.sorted {
            self.contents.sort_by(self.comparator);
            self.sorted = true;
        }
    }
}

/// Orderings used to pick the next box to split, and to order the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoxOrder {
    /// Most populated box first.
    #[default]
    Population,
    /// Largest population × volume first.
    PopulationVolume,
}

impl BoxOrder {
    pub fn comparator<'h>(self) -> Comparator<VBox<'h>> {
        match self {
            BoxOrder::Population => by_population as Comparator<VBox<'h>>,
            BoxOrder::PopulationVolume => by_population_volume as Comparator<VBox<'h>>,
        }
    }
}

fn by_population<'h>(a: &VBox<'h>, b: &VBox<'h>) -> Ordering {
    a.count().cmp(&b.count())
}

fn by_population_volume<'h>(a: &VBox<'h>, b: &VBox<'h>) -> Ordering {
    let pa = a.count() as u64 * a.volume() as u64;
    let pb = b.count() as u64 * b.volume() as u64;
    pa.cmp(&pb)
}
