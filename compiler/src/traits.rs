use crate::{error::IdlError, package::PackageTree};

/// Backend that turns a built package tree into output text.
///
/// Generators only read the tree; every package, dependency and resolved type they need is
/// reachable through [`PackageTree`].
pub trait Generator {
    fn generate(&self, tree: &PackageTree<'_>) -> Result<String, IdlError>;
}
