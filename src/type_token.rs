//! Type-erased partitions and source adapters.
//!
//! Intermediate results travel between stages as opaque [`Partition`] buffers;
//! each stage downcasts to the concrete `Vec<T>` it expects. Sources are
//! described by a payload plus a [`VecOps`] adapter that knows how to size,
//! split and fully read that payload without the runner knowing `T`.

use anyhow::{Result, anyhow};
use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

/// A partition buffer carried between nodes at runtime.
pub type Partition = Box<dyn Any + Send + Sync>;

/// Downcast a partition into `Vec<T>`, naming the stage in the error.
pub(crate) fn downcast_vec<T: 'static>(part: Partition, stage: &str) -> Result<Vec<T>> {
    part.downcast::<Vec<T>>()
        .map(|v| *v)
        .map_err(|_| anyhow!("{stage}: expected Vec<{}>", type_name::<T>()))
}

/// Type-erased helpers over a source payload.
///
/// Implementations fail when `data` is not the payload type they were built
/// for, or when reading the underlying data fails. A failed read must never be
/// reported as an empty partition.
pub trait VecOps: Send + Sync {
    /// Number of elements (or a best-effort estimate for lazy sources).
    fn len(&self, data: &dyn Any) -> Option<usize>;

    /// Split `data` into up to `n` partitions, preserving order within each one.
    fn split(&self, data: &dyn Any, n: usize) -> Result<Vec<Partition>>;

    /// Materialize the whole payload as a single partition.
    fn clone_any(&self, data: &dyn Any) -> Result<Partition>;
}

/// [`VecOps`] for an in-memory `Vec<T>`.
pub struct VecOpsImpl<T: Clone + Send + Sync + 'static>(PhantomData<T>);

impl<T: Clone + Send + Sync + 'static> VecOpsImpl<T> {
    fn payload<'a>(&self, data: &'a dyn Any) -> Result<&'a Vec<T>> {
        data.downcast_ref::<Vec<T>>()
            .ok_or_else(|| anyhow!("source payload is not Vec<{}>", type_name::<T>()))
    }
}

impl<T: Clone + Send + Sync + 'static> VecOps for VecOpsImpl<T> {
    fn len(&self, data: &dyn Any) -> Option<usize> {
        data.downcast_ref::<Vec<T>>().map(Vec::len)
    }

    fn split(&self, data: &dyn Any, n: usize) -> Result<Vec<Partition>> {
        let v = self.payload(data)?;
        let len = v.len();

        if n <= 1 || len <= 1 {
            return Ok(vec![Box::new(v.clone())]);
        }

        // contiguous chunks of ~len/n; the last may be shorter
        let chunk = len.div_ceil(n);
        Ok(v.chunks(chunk)
            .map(|c| Box::new(c.to_vec()) as Partition)
            .collect())
    }

    fn clone_any(&self, data: &dyn Any) -> Result<Partition> {
        Ok(Box::new(self.payload(data)?.clone()))
    }
}

/// Create a type-erased [`VecOps`] for `Vec<T>`.
pub fn vec_ops_for<T: Clone + Send + Sync + 'static>() -> Arc<dyn VecOps> {
    Arc::new(VecOpsImpl::<T>(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_order_and_elements() {
        let ops = vec_ops_for::<u32>();
        let data: Vec<u32> = (0..10).collect();
        let parts = ops.split(&data, 3).unwrap();
        assert_eq!(parts.len(), 3);
        let joined: Vec<u32> = parts
            .into_iter()
            .flat_map(|p| downcast_vec::<u32>(p, "test").unwrap())
            .collect();
        assert_eq!(joined, data);
    }

    #[test]
    fn wrong_payload_is_an_error() {
        let ops = vec_ops_for::<u32>();
        let data: Vec<String> = vec!["a".into()];
        assert!(ops.split(&data, 2).is_err());
        assert!(ops.clone_any(&data).is_err());
        assert_eq!(ops.len(&data), None);
    }
}
