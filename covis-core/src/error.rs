//! Error types for the covis core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while building a [`crate::ViewGraph`] from raw
/// co-visibility observations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// The pair and weight sequences differed in length.
    #[error("got {pairs} image pairs but {weights} weights")]
    LengthMismatch {
        /// Number of image pairs supplied by the caller.
        pairs: usize,
        /// Number of weights supplied by the caller.
        weights: usize,
    },
    /// A co-visibility weight was negative.
    #[error("pair ({first}, {second}) has negative weight {weight}")]
    NegativeWeight {
        /// First endpoint of the offending pair.
        first: u64,
        /// Second endpoint of the offending pair.
        second: u64,
        /// The negative weight observed on the pair.
        weight: i64,
    },
    /// A pair referenced the same image twice.
    #[error("pair references image {image} on both ends")]
    SelfPair {
        /// The image id appearing on both ends of the pair.
        image: u64,
    },
    /// The observation list contained no image pairs.
    #[error("at least one image pair is required")]
    EmptyInput,
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// The pair and weight sequences differed in length.
        LengthMismatch => LengthMismatch { .. } => "GRAPH_LENGTH_MISMATCH",
        /// A co-visibility weight was negative.
        NegativeWeight => NegativeWeight { .. } => "GRAPH_NEGATIVE_WEIGHT",
        /// A pair referenced the same image twice.
        SelfPair => SelfPair { .. } => "GRAPH_SELF_PAIR",
        /// The observation list contained no image pairs.
        EmptyInput => EmptyInput => "GRAPH_EMPTY_INPUT",
    }
}

/// Error type produced when configuring or running [`crate::SceneClustering`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SceneClusteringError {
    /// The branching factor must allow at least a bisection.
    #[error("branching must be at least 2 (got {got})")]
    InvalidBranching {
        /// The invalid branching factor supplied by the caller.
        got: usize,
    },
    /// A leaf must be allowed to hold at least one image.
    #[error("leaf_max_num_images must be at least 1 (got {got})")]
    InvalidLeafMaxNumImages {
        /// The invalid leaf size supplied by the caller.
        got: usize,
    },
    /// The raw observations were rejected before partitioning started.
    #[error("invalid co-visibility input: {error}")]
    InvalidInput {
        #[source]
        /// Underlying graph construction error.
        error: GraphError,
    },
    /// A second partition call on an object that already holds a tree.
    #[error("scene is already partitioned; build a fresh object instead")]
    AlreadyPartitioned,
}

define_error_codes! {
    /// Stable codes describing [`SceneClusteringError`] variants.
    enum SceneClusteringErrorCode for SceneClusteringError {
        /// The branching factor must allow at least a bisection.
        InvalidBranching => InvalidBranching { .. } => "CLUSTERING_INVALID_BRANCHING",
        /// A leaf must be allowed to hold at least one image.
        InvalidLeafMaxNumImages => InvalidLeafMaxNumImages { .. } => "CLUSTERING_INVALID_LEAF_MAX_NUM_IMAGES",
        /// The raw observations were rejected before partitioning started.
        InvalidInput => InvalidInput { .. } => "CLUSTERING_INVALID_INPUT",
        /// A second partition call on an object that already holds a tree.
        AlreadyPartitioned => AlreadyPartitioned => "CLUSTERING_ALREADY_PARTITIONED",
    }
}

impl SceneClusteringError {
    /// Retrieve the inner [`GraphErrorCode`] when the error originated in
    /// graph construction.
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::InvalidInput { error } => Some(error.code()),
            _ => None,
        }
    }
}

impl From<GraphError> for SceneClusteringError {
    fn from(error: GraphError) -> Self {
        Self::InvalidInput { error }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SceneClusteringError>;
