//! Testing utilities and helpers for Reprise
//!
//! This module provides ergonomic utilities for testing code that retries
//! operations. It includes scripted operations that replay a fixed list of
//! outcomes, an in-memory spreadsheet service, assertion macros, and
//! property-based testing support.
//!
//! # Examples
//!
//! ## ScriptedOp
//!
//! ```rust
//! use reprise::testing::{ScriptedOp, Step};
//! use reprise::RetryPolicy;
//! use std::io;
//!
//! let op = ScriptedOp::new(vec![
//!     Step::Fail(io::ErrorKind::TimedOut),
//!     Step::Return("ok"),
//! ]);
//!
//! let policy = RetryPolicy::new()
//!     .with_retryable_kind(io::ErrorKind::TimedOut)
//!     .with_max_attempts(3);
//!
//! let result = policy.execute(|| op.call().map_err(io::Error::from));
//! assert_eq!(result.unwrap(), "ok");
//! assert_eq!(op.calls(), 2);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use reprise::{assert_exhausted, assert_non_retryable, RetryError};
//!
//! let exhausted: Result<(), RetryError<&str>> = Err(RetryError::AttemptsExhausted);
//! assert_exhausted!(exhausted);
//!
//! let fatal: Result<(), RetryError<&str>> = Err(RetryError::NonRetryable("denied"));
//! assert_non_retryable!(fatal, "denied");
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::sheets::{
    encode_delimited, ExportFormat, SheetError, SheetSelector, SheetsClient, Workbook, Worksheet,
};

/// One scripted outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T, E> {
    /// Return this value.
    Return(T),
    /// Fail with this error.
    Fail(E),
}

impl<T, E> Step<T, E> {
    /// Convert into the result the operation produces.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Step::Return(value) => Ok(value),
            Step::Fail(error) => Err(error),
        }
    }
}

/// An operation that replays a list of outcomes and counts its calls.
///
/// Call `n` (0-based) produces step `n`; once the list runs out, the last step
/// repeats forever. Arguments passed through [`call_with`](Self::call_with) are
/// recorded in call order.
///
/// Interior mutability makes it usable from `Fn` closures; it is meant for a
/// single test thread.
#[derive(Debug)]
pub struct ScriptedOp<T, E, A = ()> {
    steps: Vec<Step<T, E>>,
    calls: Cell<u32>,
    args: RefCell<Vec<A>>,
}

impl<T: Clone, E: Clone> ScriptedOp<T, E> {
    /// Create an operation replaying `steps`.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is empty.
    pub fn new(steps: Vec<Step<T, E>>) -> Self {
        Self::recording(steps)
    }

    /// Create an operation that produces `step` on every call.
    pub fn always(step: Step<T, E>) -> Self {
        Self::recording(vec![step])
    }
}

impl<T: Clone, E: Clone, A> ScriptedOp<T, E, A> {
    /// Create an operation replaying `steps` that records arguments of type `A`.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is empty.
    pub fn recording(steps: Vec<Step<T, E>>) -> Self {
        assert!(!steps.is_empty(), "ScriptedOp needs at least one step");
        Self {
            steps,
            calls: Cell::new(0),
            args: RefCell::new(Vec::new()),
        }
    }

    /// Produce the next scripted outcome.
    pub fn call(&self) -> Result<T, E> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        let index = (n as usize).min(self.steps.len() - 1);
        self.steps[index].clone().into_result()
    }

    /// Record `args`, then produce the next scripted outcome.
    pub fn call_with(&self, args: A) -> Result<T, E> {
        self.args.borrow_mut().push(args);
        self.call()
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    /// Arguments recorded by [`call_with`](Self::call_with), oldest first.
    pub fn recorded_args(&self) -> Vec<A>
    where
        A: Clone,
    {
        self.args.borrow().clone()
    }
}

/// In-memory [`SheetsClient`].
///
/// Workbooks are registered up front; worksheet handles share their cells with
/// the registered workbook, so writes through one handle are visible through
/// every later `open_*` call.
#[derive(Debug, Default)]
pub struct MemoryClient {
    workbooks: RefCell<HashMap<String, MemoryWorkbook>>,
    fail_next_opens: Cell<u32>,
    open_calls: Cell<u32>,
}

impl MemoryClient {
    /// Create a client with no workbooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workbook, builder style.
    pub fn with_workbook(self, workbook: MemoryWorkbook) -> Self {
        self.add_workbook(workbook);
        self
    }

    /// Register a workbook, replacing any with the same name.
    pub fn add_workbook(&self, workbook: MemoryWorkbook) {
        self.workbooks
            .borrow_mut()
            .insert(workbook.name.clone(), workbook);
    }

    /// Make the next `n` calls to `open_workbook` fail with
    /// [`SheetError::RateLimited`].
    pub fn fail_next_opens(&self, n: u32) {
        self.fail_next_opens.set(n);
    }

    /// Number of `open_workbook` calls so far, failed ones included.
    pub fn open_calls(&self) -> u32 {
        self.open_calls.get()
    }
}

impl SheetsClient for MemoryClient {
    type Workbook = MemoryWorkbook;

    fn open_workbook(&self, name: &str) -> Result<MemoryWorkbook, SheetError> {
        self.open_calls.set(self.open_calls.get() + 1);

        let pending = self.fail_next_opens.get();
        if pending > 0 {
            self.fail_next_opens.set(pending - 1);
            return Err(SheetError::RateLimited);
        }

        self.workbooks
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| SheetError::WorkbookNotFound(name.to_string()))
    }
}

/// In-memory [`Workbook`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryWorkbook {
    name: String,
    sheets: Vec<MemoryWorksheet>,
}

impl MemoryWorkbook {
    /// Create an empty workbook.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheets: Vec::new(),
        }
    }

    /// Append a worksheet holding `rows`.
    pub fn with_sheet<S: Into<String>>(mut self, title: &str, rows: Vec<Vec<S>>) -> Self {
        let cells = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.sheets.push(MemoryWorksheet {
            title: title.to_string(),
            cells: Rc::new(RefCell::new(cells)),
        });
        self
    }
}

impl Workbook for MemoryWorkbook {
    type Worksheet = MemoryWorksheet;

    fn name(&self) -> &str {
        &self.name
    }

    fn worksheet(&self, selector: &SheetSelector) -> Result<MemoryWorksheet, SheetError> {
        let found = match selector {
            SheetSelector::Index(index) => self.sheets.get(*index),
            SheetSelector::Name(name) => self.sheets.iter().find(|s| &s.title == name),
        };
        found
            .cloned()
            .ok_or_else(|| SheetError::WorksheetNotFound(selector.to_string()))
    }
}

/// In-memory [`Worksheet`].
///
/// Reads outside the written area return blank cells; writes grow the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryWorksheet {
    title: String,
    cells: Rc<RefCell<Vec<Vec<String>>>>,
}

fn check_address(row: u32, col: u32) -> Result<(usize, usize), SheetError> {
    if row == 0 || col == 0 {
        return Err(SheetError::CellOutOfRange { row, col });
    }
    Ok((row as usize - 1, col as usize - 1))
}

impl Worksheet for MemoryWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn all_values(&self) -> Result<Vec<Vec<String>>, SheetError> {
        let cells = self.cells.borrow();
        let width = cells.iter().map(Vec::len).max().unwrap_or(0);
        Ok(cells
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.resize(width, String::new());
                row
            })
            .collect())
    }

    fn cell(&self, row: u32, col: u32) -> Result<String, SheetError> {
        let (r, c) = check_address(row, col)?;
        Ok(self
            .cells
            .borrow()
            .get(r)
            .and_then(|cells| cells.get(c))
            .cloned()
            .unwrap_or_default())
    }

    fn update_cell(&mut self, row: u32, col: u32, value: &str) -> Result<(), SheetError> {
        let (r, c) = check_address(row, col)?;
        let mut cells = self.cells.borrow_mut();
        if cells.len() <= r {
            cells.resize_with(r + 1, Vec::new);
        }
        let target = &mut cells[r];
        if target.len() <= c {
            target.resize(c + 1, String::new());
        }
        target[c] = value.to_string();
        Ok(())
    }

    fn export(&self, path: &Path, format: ExportFormat) -> Result<(), SheetError> {
        let bytes = encode_delimited(&self.all_values()?, format)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SheetError> {
        self.cells.borrow_mut().clear();
        Ok(())
    }
}

/// Assert that a retried call ran out of attempts without recording an error.
///
/// # Example
///
/// ```rust
/// use reprise::{assert_exhausted, RetryError};
///
/// let result: Result<i32, RetryError<String>> = Err(RetryError::AttemptsExhausted);
/// assert_exhausted!(result);
/// ```
#[macro_export]
macro_rules! assert_exhausted {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::AttemptsExhausted) => {}
            other => {
                panic!("Expected AttemptsExhausted, got: {:?}", other);
            }
        }
    };
}

/// Assert that a retried call ran out of attempts on a retryable error.
///
/// With a second argument, also checks the error equals it.
///
/// # Example
///
/// ```rust
/// use reprise::{assert_retryable, RetryError};
///
/// let result: Result<i32, _> = Err(RetryError::Retryable("timeout"));
/// assert_retryable!(result, "timeout");
/// ```
#[macro_export]
macro_rules! assert_retryable {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::Retryable(_)) => {}
            other => {
                panic!("Expected Retryable error, got: {:?}", other);
            }
        }
    };
    ($result:expr, $expected:expr) => {
        match $result {
            Err($crate::RetryError::Retryable(e)) => {
                assert_eq!(e, $expected);
            }
            other => {
                panic!(
                    "Expected Retryable error {:?}, got: {:?}",
                    $expected, other
                );
            }
        }
    };
}

/// Assert that a retried call stopped on a non-retryable error.
///
/// With a second argument, also checks the error equals it.
///
/// # Example
///
/// ```rust
/// use reprise::{assert_non_retryable, RetryError};
///
/// let result: Result<i32, _> = Err(RetryError::NonRetryable("forbidden"));
/// assert_non_retryable!(result);
/// ```
#[macro_export]
macro_rules! assert_non_retryable {
    ($result:expr) => {
        match $result {
            Err($crate::RetryError::NonRetryable(_)) => {}
            other => {
                panic!("Expected NonRetryable error, got: {:?}", other);
            }
        }
    };
    ($result:expr, $expected:expr) => {
        match $result {
            Err($crate::RetryError::NonRetryable(e)) => {
                assert_eq!(e, $expected);
            }
            other => {
                panic!(
                    "Expected NonRetryable error {:?}, got: {:?}",
                    $expected, other
                );
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl<T, E> Arbitrary for Step<T, E>
where
    T: Arbitrary + 'static,
    E: Arbitrary + 'static,
{
    type Parameters = (T::Parameters, E::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let (t_params, e_params) = args;
        prop_oneof![
            any_with::<T>(t_params).prop_map(Step::Return),
            any_with::<E>(e_params).prop_map(Step::Fail),
        ]
        .boxed()
    }
}
