use rayon::prelude::*;

use super::diagnostics::{DiagnosticLevel, Diagnostics};
use super::{
    non_broadcast_axis_pairs, reduce_axes, reduce_keep_dims, reshape_axis_partition, slice_axes,
    AxisList, FusionError,
};
use crate::env::env_flag;
use crate::graph::{NodeId, OperatorNode, Program};
use crate::shape_facts::ShapeAnalysis;

/// Axis information resolved for one operator.
#[derive(Clone, Debug, PartialEq)]
pub enum AxisInfo {
    /// Reduced axes of a reduction, and whether they are kept as size-1 dims.
    Reduce { axes: AxisList, keep_dims: bool },

    /// Sliced axes of a slice, and whether they are kept in the output.
    Slice { axes: Vec<i64>, keep_dims: bool },

    /// `(input_axis, output_axis)` pairs which are not broadcast.
    Broadcast { pairs: Vec<(usize, usize)> },

    /// `(input_end, output_end)` breakpoints of independent reshape groups.
    Reshape { partition: Vec<(usize, usize)> },
}

/// Operator kinds which have axis information.
#[derive(Clone, Copy, Debug, PartialEq)]
enum OpCategory {
    Reduce,
    Slice,
    Broadcast,
    Reshape,
}

impl OpCategory {
    fn from_op_type(op_type: &str) -> Option<OpCategory> {
        match op_type {
            "Slice" => Some(OpCategory::Slice),
            "Expand" | "Broadcast" => Some(OpCategory::Broadcast),
            "Reshape" => Some(OpCategory::Reshape),
            _ if op_type.starts_with("Reduce") => Some(OpCategory::Reduce),
            _ => None,
        }
    }
}

/// Resolve axis information for an operator, or return `None` if the operator
/// kind has none.
fn resolve_op(op: &OperatorNode, facts: &ShapeAnalysis) -> Option<Result<AxisInfo, FusionError>> {
    let info = match OpCategory::from_op_type(op.op_type())? {
        OpCategory::Reduce => reduce_axes(op, facts).and_then(|axes| {
            Ok(AxisInfo::Reduce {
                axes,
                keep_dims: reduce_keep_dims(op)?,
            })
        }),
        OpCategory::Slice => {
            slice_axes(op).map(|(axes, keep_dims)| AxisInfo::Slice { axes, keep_dims })
        }
        OpCategory::Broadcast => {
            non_broadcast_axis_pairs(op, facts).map(|pairs| AxisInfo::Broadcast { pairs })
        }
        OpCategory::Reshape => {
            reshape_axis_partition(op, facts).map(|partition| AxisInfo::Reshape { partition })
        }
    };
    Some(info)
}

/// Options that control axis planning.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerOptions {
    /// Level of diagnostics printed while planning.
    pub diagnostics: DiagnosticLevel,

    /// Resolve operators in parallel.
    pub parallel: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        PlannerOptions {
            diagnostics: DiagnosticLevel::Off,
            parallel: true,
        }
    }
}

impl PlannerOptions {
    /// Read options from the environment.
    ///
    /// - `TENFUSE_DIAGNOSTICS` sets the diagnostic level ("off", "warn" or
    ///   "info").
    /// - `TENFUSE_PARALLEL` enables or disables parallel planning.
    ///
    /// Options which are not set keep their default values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        PlannerOptions {
            diagnostics: diagnostic_level_from_var(
                std::env::var("TENFUSE_DIAGNOSTICS").ok(),
                defaults.diagnostics,
            ),
            parallel: env_flag("TENFUSE_PARALLEL", defaults.parallel),
        }
    }
}

/// Interpret the value of the `TENFUSE_DIAGNOSTICS` variable.
///
/// Unrecognized values are reported and treated as `default`.
fn diagnostic_level_from_var(value: Option<String>, default: DiagnosticLevel) -> DiagnosticLevel {
    let Some(value) = value else {
        return default;
    };
    DiagnosticLevel::parse(&value).unwrap_or_else(|| {
        eprintln!("Unrecognized diagnostic level \"{}\"", value);
        default
    })
}

/// Result of axis planning for a program.
///
/// Operators whose axis information could not be resolved are recorded as
/// rejected fusion candidates, together with the reason.
#[derive(Debug, Default)]
pub struct AxisPlan {
    resolved: Vec<(NodeId, AxisInfo)>,
    rejected: Vec<(NodeId, FusionError)>,
}

impl AxisPlan {
    /// Return the axis information for an operator, if it was resolved.
    pub fn get(&self, op_id: NodeId) -> Option<&AxisInfo> {
        self.resolved
            .binary_search_by_key(&op_id, |(id, _)| *id)
            .ok()
            .map(|idx| &self.resolved[idx].1)
    }

    /// Return the error which caused an operator to be rejected.
    pub fn rejection(&self, op_id: NodeId) -> Option<&FusionError> {
        self.rejected
            .binary_search_by_key(&op_id, |(id, _)| *id)
            .ok()
            .map(|idx| &self.rejected[idx].1)
    }

    /// Return resolved operators in program order.
    pub fn resolved(&self) -> &[(NodeId, AxisInfo)] {
        &self.resolved
    }

    /// Return rejected operators in program order.
    pub fn rejected(&self) -> &[(NodeId, FusionError)] {
        &self.rejected
    }
}

/// Resolves axis information for all reductions, slices, broadcasts and
/// reshapes in a program.
pub struct AxisPlanner {
    options: PlannerOptions,
    diagnostics: Diagnostics,
}

impl Default for AxisPlanner {
    fn default() -> Self {
        Self::new(PlannerOptions::default())
    }
}

impl AxisPlanner {
    pub fn new(options: PlannerOptions) -> Self {
        AxisPlanner {
            diagnostics: Diagnostics::with_level(options.diagnostics),
            options,
        }
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Resolve axis information for every supported operator in `program`.
    pub fn plan(&self, program: &Program) -> AxisPlan {
        let facts = ShapeAnalysis::new(program);
        let ops: Vec<(NodeId, &OperatorNode)> = program.operators().collect();

        let results: Vec<_> = if self.options.parallel {
            ops.par_iter()
                .map(|&(id, op)| (id, resolve_op(op, &facts)))
                .collect()
        } else {
            ops.iter()
                .map(|&(id, op)| (id, resolve_op(op, &facts)))
                .collect()
        };

        let mut plan = AxisPlan::default();
        for (id, result) in results {
            match result {
                Some(Ok(info)) => {
                    self.diagnostics
                        .info(program, id, format_args!("resolved {:?}", info));
                    plan.resolved.push((id, info));
                }
                Some(Err(err)) => {
                    self.diagnostics.warn(
                        program,
                        id,
                        format_args!("rejected fusion candidate: {}", err),
                    );
                    plan.rejected.push((id, err));
                }
                None => {}
            }
        }
        plan
    }
}
