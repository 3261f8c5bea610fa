//! Execution contexts.
//!
//! Operators never own their tensors. They look inputs up by role name, ask
//! the context to allocate outputs, read integer-list attributes and learn
//! which backend to run on, all through [`ExecutionContext`].
//!
//! [`LocalContext`] is a self-contained, `HashMap`-backed implementation,
//! enough to drive the operators outside of a graph engine.
//!
//! # Example
//!
//! ```rust
//! use briny_crop::context::{ExecutionContext, LocalContext};
//! use briny_crop::tensors::Tensor;
//!
//! let mut ctx = LocalContext::new()
//!     .with_input("X", Tensor::new(vec![2], vec![1.0f32, 2.0]))
//!     .with_attr("offsets", vec![1]);
//! ctx.allocate_output("Out", &[1]).unwrap();
//! let (x, out) = ctx.io("X", "Out").unwrap();
//! assert_eq!(x.shape, vec![2]);
//! assert_eq!(out.shape, vec![1]);
//! ```

use crate::backend::{get_backend, Backend};
use crate::error::{CropError, Result};
use crate::tensors::{Element, Tensor};
use std::collections::HashMap;

/// Name of the tensor being cropped.
pub const X: &str = "X";
/// Name of the cropped result.
pub const OUT: &str = "Out";
/// Name of the optional reference tensor whose shape is the crop shape.
pub const Y: &str = "Y";
/// Attribute holding one start index per axis.
pub const OFFSETS: &str = "offsets";
/// Attribute holding the crop shape when `Y` is absent.
pub const SHAPE: &str = "shape";

/// Name of the gradient variable for `name`.
///
/// ```rust
/// assert_eq!(briny_crop::context::grad_var_name("Out"), "Out@GRAD");
/// ```
#[must_use]
pub fn grad_var_name(name: &str) -> String {
    format!("{name}@GRAD")
}

/// Tensor, attribute and device access for one operator invocation.
pub trait ExecutionContext {
    /// Element type of every tensor in this context.
    type Elem: Element;

    /// Looks up an input tensor.
    ///
    /// # Errors
    /// [`CropError::MissingInput`] if no input has that name.
    fn input(&self, name: &str) -> Result<&Tensor<Self::Elem>>;

    /// Whether an input with that name exists.
    fn has_input(&self, name: &str) -> bool {
        self.input(name).is_ok()
    }

    /// Reads an integer-list attribute.
    ///
    /// # Errors
    /// [`CropError::MissingAttr`] if no attribute has that name.
    fn attr_ints(&self, name: &str) -> Result<&[i64]>;

    /// Allocates (or reallocates) a zero-filled output of the given shape.
    ///
    /// # Errors
    /// Implementations may refuse an allocation.
    fn allocate_output(&mut self, name: &str, shape: &[usize]) -> Result<()>;

    /// Borrows an input and an already allocated output at the same time.
    ///
    /// # Errors
    /// [`CropError::MissingInput`] or [`CropError::MissingOutput`].
    fn io(
        &mut self,
        input: &str,
        output: &str,
    ) -> Result<(&Tensor<Self::Elem>, &mut Tensor<Self::Elem>)>;

    /// Backend the invocation should run on.
    fn backend(&self) -> Backend;
}

/// An in-memory [`ExecutionContext`].
///
/// Inputs and outputs live in separate maps, so an output can never alias
/// an input.
#[derive(Debug, Clone)]
pub struct LocalContext<T> {
    inputs: HashMap<String, Tensor<T>>,
    outputs: HashMap<String, Tensor<T>>,
    attrs: HashMap<String, Vec<i64>>,
    backend: Option<Backend>,
}

impl<T> Default for LocalContext<T> {
    fn default() -> Self {
        Self {
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            attrs: HashMap::new(),
            backend: None,
        }
    }
}

impl<T> LocalContext<T> {
    /// Creates an empty context using the global default backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input tensor.
    #[must_use]
    pub fn with_input(mut self, name: impl Into<String>, tensor: Tensor<T>) -> Self {
        self.inputs.insert(name.into(), tensor);
        self
    }

    /// Adds an integer-list attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, values: Vec<i64>) -> Self {
        self.attrs.insert(name.into(), values);
        self
    }

    /// Pins this context to a backend instead of the global default.
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Inserts or replaces an input after construction.
    pub fn set_input(&mut self, name: impl Into<String>, tensor: Tensor<T>) {
        self.inputs.insert(name.into(), tensor);
    }

    /// Looks up an allocated output.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Tensor<T>> {
        self.outputs.get(name)
    }

    /// Removes and returns an allocated output.
    pub fn take_output(&mut self, name: &str) -> Option<Tensor<T>> {
        self.outputs.remove(name)
    }
}

impl<T: Element> ExecutionContext for LocalContext<T> {
    type Elem = T;

    fn input(&self, name: &str) -> Result<&Tensor<T>> {
        self.inputs
            .get(name)
            .ok_or_else(|| CropError::MissingInput(name.to_string()))
    }

    fn attr_ints(&self, name: &str) -> Result<&[i64]> {
        self.attrs
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| CropError::MissingAttr(name.to_string()))
    }

    fn allocate_output(&mut self, name: &str, shape: &[usize]) -> Result<()> {
        log::trace!("allocating `{name}` with shape {shape:?}");
        self.outputs.insert(name.to_string(), Tensor::zeros(shape));
        Ok(())
    }

    fn io(&mut self, input: &str, output: &str) -> Result<(&Tensor<T>, &mut Tensor<T>)> {
        let x = self
            .inputs
            .get(input)
            .ok_or_else(|| CropError::MissingInput(input.to_string()))?;
        let out = self
            .outputs
            .get_mut(output)
            .ok_or_else(|| CropError::MissingOutput(output.to_string()))?;
        Ok((x, out))
    }

    fn backend(&self) -> Backend {
        self.backend.unwrap_or_else(get_backend)
    }
}
