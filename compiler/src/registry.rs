use std::collections::HashMap;

use brine_idl_schema::TypeRef;
use log::trace;

use crate::resolved::{PackageId, ResolvedType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Type,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name:    String,
    pub kind:    SymbolKind,
    pub package: PackageId,
}

/// Symbol table of every locally declared type and enum, qualified by declaring package.
///
/// All packages must be registered before the first call to [`TypeRegistry::resolve`]: a
/// reference may name a symbol declared in a sibling or a descendant visited later.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    scopes: HashMap<PackageId, HashMap<String, Symbol>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name` in `package`. Returns false, leaving the first symbol in place, when the
    /// package already declares that name.
    pub fn register(&mut self, package: PackageId, name: &str, kind: SymbolKind) -> bool {
        let scope = self.scopes.entry(package).or_default();
        if scope.contains_key(name) {
            return false;
        }

        trace!("registered {:?} `{}` in {:?}", kind, name, package);
        scope.insert(
            name.to_owned(),
            Symbol {
                name: name.to_owned(),
                kind,
                package,
            },
        );
        true
    }

    /// Symbol declared directly in `package`.
    pub fn lookup(&self, package: PackageId, name: &str) -> Option<&Symbol> {
        self.scopes.get(&package)?.get(name)
    }

    pub fn len(&self) -> usize {
        self.scopes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves `ty` as written inside the first package of `scopes`.
    ///
    /// `scopes` lists the package followed by its ancestors up to the root; the innermost
    /// declaration wins. Builtins ignore scope. Names found nowhere resolve to
    /// [`ResolvedType::Unknown`].
    pub fn resolve(&self, scopes: &[PackageId], ty: &TypeRef) -> ResolvedType {
        match ty.name.as_str() {
            "unit" => ResolvedType::Unit,
            "string" | "bool" | "int" | "long" | "float" | "double" => ResolvedType::Simple(ty.name.clone()),
            "time" => ResolvedType::Time,
            "data" => ResolvedType::Bytes,
            "list" => {
                let element = match ty.arguments.as_slice() {
                    [element] => self.resolve(scopes, element),
                    _ => ResolvedType::Unknown,
                };
                ResolvedType::List(Box::new(element))
            }
            "map" => {
                let key = self.resolve_argument(scopes, ty, 0);
                let value = self.resolve_argument(scopes, ty, 1);
                ResolvedType::Map(Box::new(key), Box::new(value))
            }
            name => self.resolve_declared(scopes, name),
        }
    }

    fn resolve_argument(&self, scopes: &[PackageId], ty: &TypeRef, index: usize) -> ResolvedType {
        ty.arguments
            .get(index)
            .map_or(ResolvedType::Unknown, |arg| self.resolve(scopes, arg))
    }

    fn resolve_declared(&self, scopes: &[PackageId], name: &str) -> ResolvedType {
        let symbol = scopes.iter().find_map(|package| self.lookup(*package, name));
        match symbol {
            Some(Symbol { kind: SymbolKind::Type, package, .. }) => ResolvedType::UserDefined {
                name: name.to_owned(),
                package: *package,
            },
            Some(Symbol { kind: SymbolKind::Enum, package, .. }) => ResolvedType::Enum {
                name: name.to_owned(),
                package: *package,
            },
            None => ResolvedType::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: PackageId = PackageId::from_raw(0);
    const TODO: PackageId = PackageId::from_raw(1);
    const SHOP: PackageId = PackageId::from_raw(2);

    fn registry() -> TypeRegistry {
        let mut reg = TypeRegistry::new();
        assert!(reg.register(ROOT, "Item", SymbolKind::Type));
        assert!(reg.register(ROOT, "Color", SymbolKind::Enum));
        assert!(reg.register(TODO, "Item", SymbolKind::Type));
        assert!(reg.register(SHOP, "Order", SymbolKind::Type));
        reg
    }

    fn simple(name: &str) -> Box<ResolvedType> {
        Box::new(ResolvedType::Simple(name.into()))
    }

    #[test]
    fn test_builtins() {
        let reg = TypeRegistry::new();
        assert_eq!(reg.resolve(&[ROOT], &TypeRef::new("unit")), ResolvedType::Unit);
        assert_eq!(reg.resolve(&[ROOT], &TypeRef::new("long")), ResolvedType::Simple("long".into()));
        assert_eq!(reg.resolve(&[], &TypeRef::new("time")), ResolvedType::Time);
        assert_eq!(reg.resolve(&[], &TypeRef::new("data")), ResolvedType::Bytes);
    }

    #[test]
    fn test_map_of_builtins() {
        let reg = registry();
        let ty = TypeRef::generic("map", vec![TypeRef::new("string"), TypeRef::new("int")]);
        for scopes in [&[ROOT][..], &[TODO, ROOT][..], &[SHOP, ROOT][..]] {
            assert_eq!(reg.resolve(scopes, &ty), ResolvedType::Map(simple("string"), simple("int")));
        }
    }

    #[test]
    fn test_generic_argument_tolerance() {
        let reg = registry();
        let bare_list = TypeRef::new("list");
        let wide_list = TypeRef::generic("list", vec![TypeRef::new("int"), TypeRef::new("int")]);
        let half_map = TypeRef::generic("map", vec![TypeRef::new("string")]);

        let unknown = Box::new(ResolvedType::Unknown);
        assert_eq!(reg.resolve(&[ROOT], &bare_list), ResolvedType::List(unknown.clone()));
        assert_eq!(reg.resolve(&[ROOT], &wide_list), ResolvedType::List(unknown.clone()));
        assert_eq!(reg.resolve(&[ROOT], &half_map), ResolvedType::Map(simple("string"), unknown));
    }

    #[test]
    fn test_inner_scope_shadows_outer() {
        let reg = registry();
        let item = TypeRef::new("Item");
        assert_eq!(
            reg.resolve(&[TODO, ROOT], &item),
            ResolvedType::UserDefined { name: "Item".into(), package: TODO }
        );
        assert_eq!(
            reg.resolve(&[SHOP, ROOT], &item),
            ResolvedType::UserDefined { name: "Item".into(), package: ROOT }
        );
        assert_eq!(
            reg.resolve(&[SHOP, ROOT], &TypeRef::new("Color")),
            ResolvedType::Enum { name: "Color".into(), package: ROOT }
        );
    }

    #[test]
    fn test_siblings_are_not_in_scope() {
        let reg = registry();
        assert_eq!(reg.resolve(&[TODO, ROOT], &TypeRef::new("Order")), ResolvedType::Unknown);
        assert_eq!(reg.resolve(&[ROOT], &TypeRef::new("Foo")), ResolvedType::Unknown);
    }

    #[test]
    fn test_register_keeps_first() {
        let mut reg = registry();
        assert!(!reg.register(ROOT, "Color", SymbolKind::Type));
        assert_eq!(reg.lookup(ROOT, "Color").unwrap().kind, SymbolKind::Enum);
        assert_eq!(reg.len(), 4);
    }
}
