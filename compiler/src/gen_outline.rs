use std::collections::BTreeMap;

use brine_idl_schema::TypeRef;
use serde::Serialize;

use crate::{
    error::IdlError,
    package::{Package, PackageTree},
    traits::Generator,
};

/// Emits a JSON outline of every package with its declarations resolved in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineGenerator;

#[derive(Serialize)]
struct PackageOutline<'a> {
    name:         &'a str,
    namespace:    &'a str,
    path:         &'a str,
    import_path:  &'a str,
    mangled_id:   &'a str,
    children:     Vec<&'a str>,
    dependencies: Vec<&'a str>,
    options:      &'a BTreeMap<String, String>,
    types:        Vec<TypeOutline<'a>>,
    enums:        Vec<EnumOutline<'a>>,
    rpcs:         Vec<RpcOutline<'a>>,
}

#[derive(Serialize)]
struct TypeOutline<'a> {
    name:       &'a str,
    properties: Vec<PropertyOutline<'a>>,
}

#[derive(Serialize)]
struct PropertyOutline<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    type_: String,
}

#[derive(Serialize)]
struct EnumOutline<'a> {
    name:    &'a str,
    members: &'a [String],
}

#[derive(Serialize)]
struct RpcOutline<'a> {
    name:   &'a str,
    input:  Vec<String>,
    output: Vec<String>,
}

impl OutlineGenerator {
    fn outline<'a>(&self, tree: &'a PackageTree<'_>, pkg: &'a Package<'_>) -> PackageOutline<'a> {
        let ns = pkg.namespace;
        let resolve = |ty: &TypeRef| tree.resolve(pkg.id, ty).to_string();

        PackageOutline {
            name:         &pkg.name,
            namespace:    &pkg.namespace_name,
            path:         &pkg.path,
            import_path:  &pkg.import_path,
            mangled_id:   &pkg.mangled_id,
            children:     tree.children(pkg.id).map(|child| child.mangled_id.as_str()).collect(),
            dependencies: tree.dependencies(pkg.id).map(|dep| dep.mangled_id.as_str()).collect(),
            options:      &ns.options,
            types:        ns
                .types
                .iter()
                .map(|ty| TypeOutline {
                    name:       &ty.name,
                    properties: ty
                        .properties
                        .iter()
                        .map(|prop| PropertyOutline { name: &prop.name, type_: resolve(&prop.type_) })
                        .collect(),
                })
                .collect(),
            enums:        ns
                .enums
                .iter()
                .map(|en| EnumOutline { name: &en.name, members: &en.members })
                .collect(),
            rpcs:         ns
                .rpcs
                .iter()
                .map(|rpc| RpcOutline {
                    name:   &rpc.name,
                    input:  rpc.input_types.iter().map(resolve).collect(),
                    output: rpc.output_types.iter().map(resolve).collect(),
                })
                .collect(),
        }
    }
}

impl Generator for OutlineGenerator {
    fn generate(&self, tree: &PackageTree<'_>) -> Result<String, IdlError> {
        let packages: Vec<PackageOutline<'_>> = tree.iter().map(|pkg| self.outline(tree, pkg)).collect();
        Ok(serde_json::to_string_pretty(&packages)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::{compiler::parse_source, config::BuildConfig, package::build_packages};

    #[test]
    fn test_outline_shape() {
        let root = parse_source(
            "type Item { list<Tag> tags Missing other }\n\
             enum Tag { a b }\n\
             namespace todo { rpc Get(string) Item }",
        )
        .unwrap();
        let tree = build_packages(&root, &BuildConfig::default());
        let json: Value = serde_json::from_str(&OutlineGenerator.generate(&tree).unwrap()).unwrap();

        let packages = json.as_array().unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0]["name"], "rpc");
        assert_eq!(packages[0]["namespace"], "root");
        assert_eq!(packages[0]["children"], serde_json::json!(["rpc_todo_2"]));
        assert_eq!(packages[0]["types"][0]["properties"][0]["name"], "other");
        assert_eq!(packages[0]["types"][0]["properties"][0]["type"], "?");
        assert_eq!(packages[0]["types"][0]["properties"][1]["type"], "list<Tag>");
        assert_eq!(packages[0]["enums"][0]["members"], serde_json::json!(["a", "b"]));

        assert_eq!(packages[1]["path"], "todo");
        assert_eq!(packages[1]["dependencies"], serde_json::json!(["rpc_1"]));
        assert_eq!(packages[1]["rpcs"][0]["input"], serde_json::json!(["string"]));
        assert_eq!(packages[1]["rpcs"][0]["output"], serde_json::json!(["Item"]));
    }
}
