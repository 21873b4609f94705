//! Source constructors.
//!
//! - [`from_vec`] -- an in-memory `Vec<T>` source.
//! - [`from_iter`] -- collects any `IntoIterator<Item = T>` into a source.
//! - [`from_custom_source`] -- any payload paired with a [`VecOps`] adapter,
//!   used by the text line source to read files shard by shard.
//!
//! ```no_run
//! use anagrams::*;
//!
//! let session = Session::builder().build()?;
//! let p = Pipeline::new(&session);
//! let nums = from_iter(&p, 1..=4u32);
//! assert_eq!(nums.map(|n: &u32| n * n).collect_seq()?, vec![1, 4, 9, 16]);
//! # anyhow::Result::<()>::Ok(())
//! ```

use crate::node::Node;
use crate::type_token::{VecOps, vec_ops_for};
use crate::{PCollection, Pipeline, RFBound};
use std::sync::Arc;

/// Create a [`PCollection<T>`] from a pre-existing [`Vec<T>`].
pub fn from_vec<T>(p: &Pipeline, data: Vec<T>) -> PCollection<T>
where
    T: RFBound,
{
    from_custom_source::<T, _>(p, data, vec_ops_for::<T>())
}

/// Create a [`PCollection<T>`] from any iterator or collection.
pub fn from_iter<T, I>(p: &Pipeline, iter: I) -> PCollection<T>
where
    T: RFBound,
    I: IntoIterator<Item = T>,
{
    from_vec(p, iter.into_iter().collect::<Vec<T>>())
}

/// Create a [`PCollection<T>`] from a custom payload.
///
/// `vec_ops` must produce `Vec<T>` partitions from `payload`; a mismatch is
/// reported as an error when the pipeline runs.
pub fn from_custom_source<T, P>(p: &Pipeline, payload: P, vec_ops: Arc<dyn VecOps>) -> PCollection<T>
where
    T: RFBound,
    P: 'static + Send + Sync,
{
    let id = p.insert_node(Node::Source {
        payload: Arc::new(payload),
        vec_ops,
    });
    PCollection::attach(p.clone(), id)
}
