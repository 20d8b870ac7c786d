//! Per-call parse state.
//!
//! A [`Session`] is created by the orchestrator for one `parse` call and
//! handed to every grammar function as `&mut Session`. It never outlives
//! that call, so separate calls (on any thread) cannot observe each other.

use std::sync::Arc;

use crate::ast::{ExpressionNode, NodeRef};
use crate::ParseError;

/// Registry and error list lengths at some point of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    expressions: usize,
    errors: usize,
    halted: bool,
}

pub struct Session<'s> {
    source: Arc<str>,
    halt_on_error: bool,
    halted: bool,
    errors: Vec<ParseError>,
    expressions: Vec<ExpressionNode>,
    /// Registry of an earlier scan over the same text.
    handled: Vec<ExpressionNode>,
    expression_handler: Option<&'s mut dyn FnMut(&mut ExpressionNode)>,
    observer: Option<&'s mut dyn FnMut(NodeRef<'_>)>,
}

impl<'s> Session<'s> {
    /// A fresh session. With `halt_on_error`, the first committed error
    /// stops every composite parser.
    pub fn new(source: Arc<str>, halt_on_error: bool) -> Self {
        Self {
            source,
            halt_on_error,
            halted: false,
            errors: Vec::new(),
            expressions: Vec::new(),
            handled: Vec::new(),
            expression_handler: None,
            observer: None,
        }
    }

    pub fn set_expression_handler(&mut self, handler: &'s mut dyn FnMut(&mut ExpressionNode)) {
        self.expression_handler = Some(handler);
    }

    pub fn set_observer(&mut self, observer: &'s mut dyn FnMut(NodeRef<'_>)) {
        self.observer = Some(observer);
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether composite parsers must unwind now.
    pub fn is_halting(&self) -> bool {
        self.halted
    }

    /// Record a grammar error.
    ///
    /// Ignored once the session has halted, so a halting session holds
    /// exactly one grammar error.
    pub fn commit_error(&mut self, message: &str, position: usize) {
        if self.halted {
            return;
        }
        tracing::trace!(error = message, position, "parse error");
        self.errors.push(ParseError::new(message, position, Arc::clone(&self.source)));
        if self.halt_on_error {
            self.halted = true;
        }
    }

    /// Record an error found after the grammar has finished, regardless of
    /// halting.
    pub fn push_error(&mut self, message: &str, position: usize) {
        tracing::trace!(error = message, position, "parse error");
        self.errors.push(ParseError::new(message, position, Arc::clone(&self.source)));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Drop all errors and leave the halted state.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
        self.halted = false;
    }

    pub fn expressions(&self) -> &[ExpressionNode] {
        &self.expressions
    }

    /// Empty the registry before the same text is scanned again.
    ///
    /// Expressions of the next scan that sit at a span already handled take
    /// the earlier handler result instead of running the handler and the
    /// observer a second time.
    pub fn restart_expressions(&mut self) {
        self.handled.append(&mut self.expressions);
    }

    /// Mark the current registry and error list.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            expressions: self.expressions.len(),
            errors: self.errors.len(),
            halted: self.halted,
        }
    }

    /// Forget expressions and errors recorded since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.expressions.truncate(checkpoint.expressions);
        self.errors.truncate(checkpoint.errors);
        self.halted = checkpoint.halted;
    }

    /// Report a finished node to the observer.
    pub fn observe(&mut self, node: NodeRef<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(node);
        }
    }

    /// Run the expression handler on a freshly parsed expression, record
    /// it and report it.
    pub fn finish_expression(&mut self, node: &mut ExpressionNode) {
        let earlier = self
            .handled
            .iter()
            .find(|handled| handled.expression_span == node.expression_span);
        if let Some(earlier) = earlier {
            node.expression.clone_from(&earlier.expression);
            node.value_type = earlier.value_type;
            self.expressions.push(node.clone());
            return;
        }

        if let Some(handler) = self.expression_handler.as_mut() {
            handler(&mut *node);
        }
        self.expressions.push(node.clone());
        self.observe(NodeRef::Expression(&*node));
    }

    /// Consume the session, returning the expression registry and errors.
    pub fn finish(self) -> (Vec<ExpressionNode>, Vec<ParseError>) {
        (self.expressions, self.errors)
    }
}
