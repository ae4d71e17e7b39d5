//! Covis core library.
//!
//! Partitions an image co-visibility graph, produced by an upstream
//! feature-matching stage, into a hierarchy of overlapping clusters small
//! enough for independent local reconstruction, while sibling clusters keep
//! shared images as anchors for a later merge stage.

mod builder;
mod cluster;
mod clustering;
mod error;
mod graph;
mod partition;

pub use crate::{
    builder::{ClusteringOptions, SceneClusteringBuilder},
    cluster::Cluster,
    clustering::SceneClustering,
    error::{
        GraphError, GraphErrorCode, Result, SceneClusteringError, SceneClusteringErrorCode,
    },
    graph::{ImageId, ViewGraph},
    partition::{GraphPartitioner, NormalizedCut},
};
