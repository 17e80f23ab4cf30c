use std::fmt;

/// Index of a [`Package`](crate::package::Package) in its [`PackageTree`](crate::package::PackageTree).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

impl PackageId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageId({})", self.0)
    }
}

/// Scope-resolved meaning of a [`TypeRef`](brine_idl_schema::TypeRef).
///
/// `Map` keys are not restricted to `string`; generators that need string-keyed maps must
/// check the key themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Unit,
    /// `string`, `bool`, `int`, `long`, `float` or `double`.
    Simple(String),
    Time,
    Bytes,
    List(Box<ResolvedType>),
    Map(Box<ResolvedType>, Box<ResolvedType>),
    UserDefined { name: String, package: PackageId },
    Enum { name: String, package: PackageId },
    Unknown,
}

impl ResolvedType {
    /// Package declaring this type, for user-defined types and enums.
    pub fn owner(&self) -> Option<PackageId> {
        match self {
            ResolvedType::UserDefined { package, .. } | ResolvedType::Enum { package, .. } => Some(*package),
            _ => None,
        }
    }

    /// Calls `visit` with every owning package, looking through list and map arguments.
    pub fn visit_owners(&self, visit: &mut impl FnMut(PackageId)) {
        match self {
            ResolvedType::List(element) => element.visit_owners(visit),
            ResolvedType::Map(key, value) => {
                key.visit_owners(visit);
                value.visit_owners(visit);
            }
            other => {
                if let Some(package) = other.owner() {
                    visit(package);
                }
            }
        }
    }

    /// False if this type or any of its arguments is [`ResolvedType::Unknown`].
    pub fn is_known(&self) -> bool {
        match self {
            ResolvedType::Unknown => false,
            ResolvedType::List(element) => element.is_known(),
            ResolvedType::Map(key, value) => key.is_known() && value.is_known(),
            _ => true,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Unit => f.write_str("unit"),
            ResolvedType::Simple(name) => f.write_str(name),
            ResolvedType::Time => f.write_str("time"),
            ResolvedType::Bytes => f.write_str("data"),
            ResolvedType::List(element) => write!(f, "list<{}>", element),
            ResolvedType::Map(key, value) => write!(f, "map<{},{}>", key, value),
            ResolvedType::UserDefined { name, .. } | ResolvedType::Enum { name, .. } => f.write_str(name),
            ResolvedType::Unknown => f.write_str("?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, package: u32) -> ResolvedType {
        ResolvedType::UserDefined { name: name.into(), package: PackageId::from_raw(package) }
    }

    #[test]
    fn owners_are_found_through_containers() {
        let ty = ResolvedType::Map(
            Box::new(ResolvedType::Enum { name: "Kind".into(), package: PackageId::from_raw(2) }),
            Box::new(ResolvedType::List(Box::new(user("Item", 1)))),
        );

        let mut owners = Vec::new();
        ty.visit_owners(&mut |package| owners.push(package));
        assert_eq!(owners, [PackageId::from_raw(2), PackageId::from_raw(1)]);
        assert_eq!(ty.owner(), None);
    }

    #[test]
    fn unknown_anywhere_is_not_known() {
        assert!(!ResolvedType::List(Box::new(ResolvedType::Unknown)).is_known());
        assert!(ResolvedType::List(Box::new(ResolvedType::Time)).is_known());
        assert_eq!(ResolvedType::List(Box::new(ResolvedType::Unknown)).to_string(), "list<?>");
    }
}
