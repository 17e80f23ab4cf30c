use std::collections::HashSet;

use brine_idl_schema::{Namespace, TypeRef};
use log::{debug, warn};

use crate::{
    config::BuildConfig,
    registry::{SymbolKind, TypeRegistry},
    resolved::{PackageId, ResolvedType},
    utils::{join_path, snake_ident},
};

/// Compilation unit built from one [`Namespace`].
#[derive(Debug, Clone)]
pub struct Package<'ns> {
    pub id:             PackageId,
    /// Position in the build traversal, starting at 1 for the root.
    pub number:         usize,
    /// Display name: the scope's name option, else the namespace name.
    pub name:           String,
    pub namespace_name: String,
    /// `/`-joined lower-cased names from the root; empty for the root.
    pub path:           String,
    pub import_path:    String,
    pub mangled_id:     String,
    pub namespace:      &'ns Namespace,
    pub parent:         Option<PackageId>,
    pub children:       Vec<PackageId>,
    /// Other packages whose types this package mentions, sorted by name then mangled id.
    pub dependencies:   Vec<PackageId>,
}

/// A type reference that resolved to [`ResolvedType::Unknown`], in whole or in part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    pub package:     PackageId,
    /// `Type.property` or `rpc Name`.
    pub declaration: String,
    /// The reference as written, e.g. `map<string,User>`.
    pub type_name:   String,
}

/// Packages of a merged namespace tree, stored in pre-order.
#[derive(Debug)]
pub struct PackageTree<'ns> {
    packages:   Vec<Package<'ns>>,
    registry:   TypeRegistry,
    unresolved: Vec<UnresolvedRef>,
}

/// Builds the package tree for `root`.
///
/// Pass one creates every package and registers every declared symbol; pass two resolves each
/// package's references into its dependency list. Output depends only on `root` and `config`.
pub fn build_packages<'ns>(root: &'ns Namespace, config: &BuildConfig) -> PackageTree<'ns> {
    let mut ctx = BuildContext {
        config,
        packages: Vec::new(),
        registry: TypeRegistry::new(),
        next_number: 1,
    };
    ctx.add_package(root, None);

    let mut tree = PackageTree {
        packages: ctx.packages,
        registry: ctx.registry,
        unresolved: Vec::new(),
    };
    tree.resolve_imports();

    debug!(
        "built {} packages with {} symbols, {} unresolved references",
        tree.packages.len(),
        tree.registry.len(),
        tree.unresolved.len()
    );
    tree
}

struct BuildContext<'c, 'ns> {
    config:      &'c BuildConfig,
    packages:    Vec<Package<'ns>>,
    registry:    TypeRegistry,
    next_number: usize,
}

impl<'c, 'ns> BuildContext<'c, 'ns> {
    fn add_package(&mut self, ns: &'ns Namespace, parent: Option<PackageId>) -> PackageId {
        let id = PackageId::from_raw(self.packages.len() as u32);
        let number = self.next_number;
        self.next_number += 1;

        let name = self.display_name(ns, parent);
        let explicit_import = ns.option(&self.config.import_option);
        let (path, import_path) = match parent {
            None => (
                String::new(),
                explicit_import.unwrap_or(self.config.default_import_path.as_str()).to_owned(),
            ),
            Some(parent) => {
                let parent = &self.packages[parent.index()];
                let segment = name.to_lowercase();
                let import_path = match explicit_import {
                    Some(import_path) => import_path.to_owned(),
                    None => join_path(&parent.import_path, &segment),
                };
                (join_path(&parent.path, &segment), import_path)
            }
        };
        let mangled_id = self.mangle(&import_path, &path, number);

        self.packages.push(Package {
            id,
            number,
            name,
            namespace_name: ns.name.clone(),
            path,
            import_path,
            mangled_id,
            namespace: ns,
            parent,
            children: Vec::new(),
            dependencies: Vec::new(),
        });
        self.register_symbols(id, ns);

        let mut children: Vec<PackageId> = ns
            .children
            .iter()
            .map(|child| self.add_package(child, Some(id)))
            .collect();
        children.sort_by(|a, b| {
            let (a, b) = (&self.packages[a.index()], &self.packages[b.index()]);
            a.name.cmp(&b.name).then(a.number.cmp(&b.number))
        });
        self.warn_path_collisions(&children);
        self.packages[id.index()].children = children;

        id
    }

    /// Siblings whose names differ only in case share a path; lookups by path see the first.
    fn warn_path_collisions(&self, siblings: &[PackageId]) {
        let mut seen = HashSet::new();
        for sibling in siblings {
            let pkg = &self.packages[sibling.index()];
            if !seen.insert(pkg.path.as_str()) {
                warn!("package `{}` shares the path `{}` with a sibling", pkg.name, pkg.path);
            }
        }
    }

    fn display_name(&self, ns: &Namespace, parent: Option<PackageId>) -> String {
        if let Some(name) = ns.option(&self.config.name_option) {
            return name.to_owned();
        }
        if parent.is_none() && ns.is_root() {
            return self.config.default_name.clone();
        }
        ns.name.clone()
    }

    fn mangle(&self, import_path: &str, path: &str, number: usize) -> String {
        let base = if import_path.is_empty() { path } else { import_path };
        match snake_ident(base) {
            base if base.is_empty() => format!("{}_{}", self.config.mangle_prefix, number),
            base => format!("{}_{}_{}", self.config.mangle_prefix, base, number),
        }
    }

    fn register_symbols(&mut self, id: PackageId, ns: &Namespace) {
        for ty in &ns.types {
            self.registry.register(id, &ty.name, SymbolKind::Type);
        }
        for en in &ns.enums {
            if !self.registry.register(id, &en.name, SymbolKind::Enum) {
                warn!(
                    "enum `{}` in package `{}` clashes with a type of the same name, the type wins",
                    en.name, self.packages[id.index()].name
                );
            }
        }
    }
}

impl<'ns> PackageTree<'ns> {
    pub fn root(&self) -> &Package<'ns> {
        &self.packages[0]
    }

    /// Package for `id`. Ids are only handed out by this tree, so the lookup cannot miss.
    pub fn get(&self, id: PackageId) -> &Package<'ns> {
        &self.packages[id.index()]
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// All packages, parents before children.
    pub fn iter(&self) -> std::slice::Iter<'_, Package<'ns>> {
        self.packages.iter()
    }

    pub fn parent(&self, id: PackageId) -> Option<&Package<'ns>> {
        self.get(id).parent.map(|parent| self.get(parent))
    }

    pub fn children(&self, id: PackageId) -> impl Iterator<Item = &Package<'ns>> {
        self.get(id).children.iter().map(move |child| self.get(*child))
    }

    pub fn dependencies(&self, id: PackageId) -> impl Iterator<Item = &Package<'ns>> {
        self.get(id).dependencies.iter().map(move |dep| self.get(*dep))
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: PackageId) -> Vec<PackageId> {
        let mut chain = vec![id];
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).parent;
        }
        chain
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Package<'ns>> {
        self.packages.iter().find(|pkg| pkg.path == path)
    }

    /// Option `key` as set on `id` or, failing that, its nearest ancestor that sets it.
    pub fn option(&self, id: PackageId, key: &str) -> Option<&'ns str> {
        self.ancestors(id)
            .into_iter()
            .find_map(|scope| self.get(scope).namespace.option(key))
    }

    /// Resolves `ty` as written inside package `id`.
    pub fn resolve(&self, id: PackageId, ty: &TypeRef) -> ResolvedType {
        self.registry.resolve(&self.ancestors(id), ty)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// References that did not fully resolve, in package order.
    pub fn unresolved(&self) -> &[UnresolvedRef] {
        &self.unresolved
    }

    fn resolve_imports(&mut self) {
        for index in 0..self.packages.len() {
            let id = PackageId::from_raw(index as u32);
            let (dependencies, unresolved) = self.collect_dependencies(id);
            self.packages[index].dependencies = dependencies;
            self.unresolved.extend(unresolved);
        }
    }

    fn collect_dependencies(&self, id: PackageId) -> (Vec<PackageId>, Vec<UnresolvedRef>) {
        let scopes = self.ancestors(id);
        let package = self.get(id);
        let mut dependencies = HashSet::new();
        let mut unresolved = Vec::new();

        let mut check = |declaration: String, type_ref: &TypeRef| {
            let resolved = self.registry.resolve(&scopes, type_ref);
            if !resolved.is_known() {
                warn!(
                    "package `{}`: cannot resolve type `{}` in {}",
                    package.name, type_ref, declaration
                );
                unresolved.push(UnresolvedRef {
                    package: id,
                    declaration,
                    type_name: type_ref.to_string(),
                });
            }
            resolved.visit_owners(&mut |owner| {
                if owner != id {
                    dependencies.insert(owner);
                }
            });
        };

        for ty in &package.namespace.types {
            for prop in &ty.properties {
                check(format!("{}.{}", ty.name, prop.name), &prop.type_);
            }
        }
        for rpc in &package.namespace.rpcs {
            for type_ref in rpc.type_refs() {
                check(format!("rpc {}", rpc.name), type_ref);
            }
        }

        let mut dependencies: Vec<PackageId> = dependencies.into_iter().collect();
        dependencies.sort_by(|a, b| {
            let (a, b) = (self.get(*a), self.get(*b));
            a.name.cmp(&b.name).then_with(|| a.mangled_id.cmp(&b.mangled_id))
        });
        (dependencies, unresolved)
    }
}
