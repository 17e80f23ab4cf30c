use crate::{Enum, Namespace, Property, Rpc, Type, TypeRef};

/// Closed set of named nodes in the spec model.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Namespace(Namespace),
    Type(Type),
    Enum(Enum),
    Rpc(Rpc),
    Property(Property),
    TypeRef(TypeRef),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Namespace(ns) => &ns.name,
            Node::Type(ty) => &ty.name,
            Node::Enum(en) => &en.name,
            Node::Rpc(rpc) => &rpc.name,
            Node::Property(prop) => &prop.name,
            Node::TypeRef(ty) => &ty.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Namespace(_) => "namespace",
            Node::Type(_) => "type",
            Node::Enum(_) => "enum",
            Node::Rpc(_) => "rpc",
            Node::Property(_) => "property",
            Node::TypeRef(_) => "type reference",
        }
    }

    /// Combines two nodes that share a name.
    ///
    /// Namespaces, types and enums merge. RPCs, properties and type references have no merge
    /// rule, so `incoming` replaces `existing`; the same happens for mismatched kinds. The result
    /// therefore always has the kind of `incoming`.
    pub fn merge(existing: Node, incoming: Node) -> Node {
        match (existing, incoming) {
            (Node::Namespace(ns), Node::Namespace(other)) => Node::Namespace(ns.merge(other)),
            (Node::Type(ty), Node::Type(other)) => Node::Type(ty.merge(other)),
            (Node::Enum(en), Node::Enum(other)) => Node::Enum(en.merge(other)),
            (Node::Rpc(_), incoming @ Node::Rpc(_)) => incoming,
            (Node::Property(_), incoming @ Node::Property(_)) => incoming,
            (Node::TypeRef(_), incoming @ Node::TypeRef(_)) => incoming,
            (_, incoming) => incoming,
        }
    }
}

/// A node kind that can be stored in a [`Mapping`](crate::Mapping).
pub trait SpecNode: Into<Node> + TryFrom<Node, Error = Node> {
    fn name(&self) -> &str;
}

macro_rules! spec_node {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Node {
            fn from(node: $ty) -> Self {
                Node::$variant(node)
            }
        }

        impl TryFrom<Node> for $ty {
            type Error = Node;

            fn try_from(node: Node) -> Result<Self, Node> {
                match node {
                    Node::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }

        impl SpecNode for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

spec_node!(Namespace, Namespace);
spec_node!(Type, Type);
spec_node!(Enum, Enum);
spec_node!(Rpc, Rpc);
spec_node!(Property, Property);
spec_node!(TypeRef, TypeRef);
