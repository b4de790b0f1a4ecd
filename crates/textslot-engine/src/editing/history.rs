use std::collections::VecDeque;

use crate::editing::changes::ChangeRecord;
use crate::editing::selection::SelectionRange;

/// Records committed by one edit command, with the selection around it
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub records: Vec<ChangeRecord>,
    pub selection_before: Option<SelectionRange>,
    pub selection_after: Option<SelectionRange>,
}

/// Linear undo/redo stacks
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Transaction>,
    redo: Vec<Transaction>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Commit a new transaction. Clears the redo stack and drops the oldest
    /// entry once the limit is reached.
    pub fn push(&mut self, transaction: Transaction) {
        self.redo.clear();
        self.undo.push_back(transaction);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub(crate) fn take_undo(&mut self) -> Option<Transaction> {
        self.undo.pop_back()
    }

    pub(crate) fn take_redo(&mut self) -> Option<Transaction> {
        self.redo.pop()
    }

    pub(crate) fn undone(&mut self, transaction: Transaction) {
        self.redo.push(transaction);
    }

    pub(crate) fn redone(&mut self, transaction: Transaction) {
        self.undo.push_back(transaction);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }
}
