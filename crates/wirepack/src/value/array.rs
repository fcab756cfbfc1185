use std::mem;
use std::ops::Deref;

use crate::value::{dismantle, Value};

/// An ordered, owned sequence of values. Read-only; derefs to `[Value]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Array(Vec<Value>);

impl Array {
    pub fn new(items: Vec<Value>) -> Self {
        Array(items)
    }

    /// Releases the elements, e.g. to build a modified copy.
    pub fn into_vec(mut self) -> Vec<Value> {
        mem::take(&mut self.0)
    }

    pub(super) fn take_items(&mut self) -> Vec<Value> {
        mem::take(&mut self.0)
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        if self.0.iter().any(Value::is_container) {
            dismantle(self.take_items());
        }
    }
}

impl Deref for Array {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array(items)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(mut self) -> Self::IntoIter {
        self.take_items().into_iter()
    }
}
