//! Store-side execution plan for a query descriptor

use crate::query::descriptor::{Filter, QueryDescriptor, SortOrder, Window};

/// What the primary store must do, in order: filter, order, then skip/take
#[derive(Debug)]
pub struct QueryPlan<'a, T> {
    pub filter: Option<&'a Filter<T>>,
    pub order: Option<&'a SortOrder<T>>,
    pub window: Option<Window>,
}

impl<'a, T> QueryPlan<'a, T> {
    pub fn from_descriptor(query: &'a QueryDescriptor<T>) -> Self {
        Self {
            filter: query.filter_ref(),
            order: query.order_ref(),
            window: query.window(),
        }
    }

    /// Execute the plan against an in-memory sequence, preserving input order
    /// where the ordering leaves ties
    pub fn apply<I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut rows: Vec<T> = match self.filter {
            Some(filter) => items.into_iter().filter(|item| filter.matches(item)).collect(),
            None => items.into_iter().collect(),
        };

        if let Some(order) = self.order {
            rows.sort_by(|a, b| order.compare(a, b));
        }

        match self.window {
            Some(Window { skip, take }) => rows.into_iter().skip(skip).take(take).collect(),
            None => rows,
        }
    }
}
