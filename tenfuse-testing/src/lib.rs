//! Internal testing utilities for the tenfuse crates.

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Run a table of test cases, collecting failures instead of stopping at the
/// first one.
///
/// Axis resolution tests are mostly tables of `(attributes, shapes,
/// expected)` rows. `test_each` runs every row, catches panics from failing
/// rows and then panics once with the debug representation of each failed
/// row, so a single run shows every broken case.
///
/// ```
/// use tenfuse_testing::TestCases;
///
/// #[derive(Debug)]
/// struct Case {
///     axis: i64,
///     rank: i64,
///     expected: i64,
/// }
///
/// let cases = [
///     Case { axis: -1, rank: 3, expected: 2 },
///     Case { axis: 1, rank: 3, expected: 1 },
/// ];
///
/// cases.test_each(|case| {
///     let resolved = if case.axis < 0 { case.axis + case.rank } else { case.axis };
///     assert_eq!(resolved, case.expected);
/// });
/// ```
///
/// Cases and any values captured by the test closure must be unwind safe.
/// Build values with interior mutability inside the closure, or wrap them
/// in [`AssertUnwindSafe`](std::panic::AssertUnwindSafe).
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call `test` with a reference to each case.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Call `test` with each case by value.
    ///
    /// The debug representation of each case is captured before the call,
    /// since the case is moved into the test function.
    fn test_each_value(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe;
}

fn report_failures(failures: &[String]) {
    assert!(
        failures.is_empty(),
        "{} test cases failed: [{}]",
        failures.len(),
        failures.join(", ")
    );
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let failures: Vec<String> = self
            .into_iter()
            .filter(|case| std::panic::catch_unwind(|| test(case)).is_err())
            .map(|case| format!("{:?}", case))
            .collect();
        report_failures(&failures);
    }

    fn test_each_value(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe,
    {
        let mut failures = Vec::new();
        for case in self {
            let desc = format!("{:?}", case);
            let test = &test;
            if std::panic::catch_unwind(move || test(case)).is_err() {
                failures.push(desc);
            }
        }
        report_failures(&failures);
    }
}
