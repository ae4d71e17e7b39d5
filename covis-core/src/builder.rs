//! Configuration surface for hierarchical scene clustering.
//!
//! Exposes the raw [`ClusteringOptions`] with its consistency predicate and
//! the builder used to validate a configuration before any graph work
//! begins.

use crate::{
    Result,
    clustering::SceneClustering,
    error::SceneClusteringError,
};

/// Configuration for hierarchical scene clustering.
///
/// All three values are validated together before partitioning; an object
/// holding invalid options can never be constructed. `image_overlap` is a
/// `usize`, so its non-negativity is enforced by the type rather than by
/// [`Self::check`].
///
/// # Examples
/// ```
/// use covis_core::ClusteringOptions;
///
/// let options = ClusteringOptions::default();
/// assert!(options.check());
/// assert!(!ClusteringOptions { branching: 1, ..options }.check());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusteringOptions {
    /// Fan-out of every internal split.
    pub branching: usize,
    /// Number of images duplicated across sibling clusters per split.
    pub image_overlap: usize,
    /// Size threshold that stops recursion; a leaf holds at most
    /// `leaf_max_num_images + image_overlap` images.
    pub leaf_max_num_images: usize,
}

impl Default for ClusteringOptions {
    fn default() -> Self {
        Self {
            branching: 2,
            image_overlap: 50,
            leaf_max_num_images: 500,
        }
    }
}

impl ClusteringOptions {
    /// Returns whether the configuration is consistent:
    /// `branching >= 2` and `leaf_max_num_images >= 1`.
    #[must_use]
    pub const fn check(&self) -> bool {
        self.branching >= 2 && self.leaf_max_num_images >= 1
    }

    /// Validates the configuration, naming the first offending field.
    pub(crate) const fn validate(&self) -> Result<()> {
        if self.branching < 2 {
            return Err(SceneClusteringError::InvalidBranching {
                got: self.branching,
            });
        }
        if self.leaf_max_num_images < 1 {
            return Err(SceneClusteringError::InvalidLeafMaxNumImages {
                got: self.leaf_max_num_images,
            });
        }
        Ok(())
    }
}

/// Configures and constructs [`SceneClustering`] instances.
///
/// # Examples
/// ```
/// use covis_core::SceneClusteringBuilder;
///
/// let clustering = SceneClusteringBuilder::new()
///     .with_branching(3)
///     .with_image_overlap(10)
///     .with_leaf_max_num_images(100)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(clustering.options().branching, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SceneClusteringBuilder {
    options: ClusteringOptions,
}

impl SceneClusteringBuilder {
    /// Creates a builder populated with the default options.
    ///
    /// # Examples
    /// ```
    /// use covis_core::SceneClusteringBuilder;
    ///
    /// let builder = SceneClusteringBuilder::new();
    /// assert_eq!(builder.options().branching, 2);
    /// assert_eq!(builder.options().leaf_max_num_images, 500);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the branching factor of every internal split.
    #[must_use]
    pub const fn with_branching(mut self, branching: usize) -> Self {
        self.options.branching = branching;
        self
    }

    /// Overrides the number of images duplicated across sibling clusters.
    #[must_use]
    pub const fn with_image_overlap(mut self, image_overlap: usize) -> Self {
        self.options.image_overlap = image_overlap;
        self
    }

    /// Overrides the leaf size threshold that stops recursion.
    #[must_use]
    pub const fn with_leaf_max_num_images(mut self, leaf_max_num_images: usize) -> Self {
        self.options.leaf_max_num_images = leaf_max_num_images;
        self
    }

    /// Returns the currently configured options.
    #[must_use]
    pub const fn options(&self) -> &ClusteringOptions {
        &self.options
    }

    /// Validates the configuration and constructs a [`SceneClustering`].
    ///
    /// # Errors
    /// Returns [`SceneClusteringError::InvalidBranching`] when
    /// `branching < 2` and [`SceneClusteringError::InvalidLeafMaxNumImages`]
    /// when `leaf_max_num_images < 1`.
    ///
    /// # Examples
    /// ```
    /// use covis_core::{SceneClusteringBuilder, SceneClusteringError};
    ///
    /// let err = SceneClusteringBuilder::new()
    ///     .with_branching(1)
    ///     .build()
    ///     .expect_err("branching below 2 is invalid");
    /// assert_eq!(err, SceneClusteringError::InvalidBranching { got: 1 });
    /// ```
    pub fn build(self) -> Result<SceneClustering> {
        SceneClustering::new(self.options)
    }
}
