use std::cell::RefCell;

use rustc_hash::FxHashSet;

use crate::graph::{NodeId, Program};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Don't show any diagnostics.
    Off,
    /// Report only rejected fusion candidates.
    Warn,
    /// Report all resolved operators.
    Info,
}

impl DiagnosticLevel {
    /// Parse a level name such as "warn" (case-insensitive).
    pub fn parse(s: &str) -> Option<DiagnosticLevel> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" | "none" => Some(DiagnosticLevel::Off),
            "warn" | "warning" => Some(DiagnosticLevel::Warn),
            "info" | "all" => Some(DiagnosticLevel::Info),
            _ => None,
        }
    }
}

/// Diagnostic reporter for fusion axis planning.
pub struct Diagnostics {
    /// Nodes against which diagnostics have been reported at the `Warn` level.
    warned_nodes: RefCell<FxHashSet<NodeId>>,
    level: DiagnosticLevel,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_level(DiagnosticLevel::Off)
    }

    pub fn with_level(level: DiagnosticLevel) -> Self {
        Self {
            warned_nodes: RefCell::new(FxHashSet::default()),
            level,
        }
    }

    /// Enable reporting of all messages at or above a given level.
    pub fn set_level(&mut self, level: DiagnosticLevel) {
        self.level = level;
    }

    /// Return true if diagnostic messages are enabled at a given level.
    pub fn enabled(&self, level: DiagnosticLevel) -> bool {
        self.level >= level
    }

    /// Log a diagnostic message for a given node at the [`Info`](DiagnosticLevel::Info) level.
    pub fn info(&self, program: &Program, node: NodeId, message: std::fmt::Arguments<'_>) {
        if !self.enabled(DiagnosticLevel::Info) {
            return;
        }
        self.log(DiagnosticLevel::Info, program, node, message);
    }

    /// Log a diagnostic message for a given node at the [`Warn`](DiagnosticLevel::Warn) level.
    ///
    /// Only the first warning for each node is reported.
    pub fn warn(&self, program: &Program, node: NodeId, message: std::fmt::Arguments<'_>) {
        if !self.enabled(DiagnosticLevel::Warn) || !self.warned_nodes.borrow_mut().insert(node) {
            return;
        }
        self.log(DiagnosticLevel::Warn, program, node, message);
    }

    /// Return the number of nodes which have had warnings reported.
    pub fn warned_count(&self) -> usize {
        self.warned_nodes.borrow().len()
    }

    fn log(
        &self,
        level: DiagnosticLevel,
        program: &Program,
        node: NodeId,
        message: std::fmt::Arguments<'_>,
    ) {
        let level_char = match level {
            DiagnosticLevel::Warn => 'W',
            DiagnosticLevel::Info => 'I',
            DiagnosticLevel::Off => return,
        };
        println!("{}| {}: {}", level_char, program.node_name(node), message);
    }
}
