use termtree::Tree;
use tracing::instrument;

use super::arena::Network;
use crate::domain::Key;
use crate::node::NodeKind;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Network {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        match self.root() {
            Some(root) => {
                let mut tree = Tree::new(label(self, root));
                build_tree(self, root, &mut tree);
                tree
            }
            None => Tree::new("Empty network".to_string()),
        }
    }
}

fn build_tree(network: &Network, key: Key, parent_tree: &mut Tree<String>) {
    if let Some(node) = network.get(key) {
        for child in node.connections().children() {
            let mut child_tree = Tree::new(label(network, child));
            build_tree(network, child, &mut child_tree);
            parent_tree.push(child_tree);
        }
    }
}

fn label(network: &Network, key: Key) -> String {
    match network.get(key).map(|node| node.kind()) {
        Some(NodeKind::Ghost) => format!("{key} (ghost)"),
        Some(_) => key.to_string(),
        None => format!("{key} (missing)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NetworkBuilder, NetworkDescription};

    #[test]
    fn given_ghost_confluence_when_rendering_then_marks_ghost() {
        let description = NetworkDescription::from_toml_str(
            r#"
[[subbasin]]
id = 1
start = { x = 0.0, y = 0.0 }
end = { x = 0.0, y = 0.0 }
[[subbasin]]
id = 2
parent = 1
start = { x = 0.0, y = 0.0 }
end = { x = 0.0, y = 0.0 }
[[subbasin]]
id = 3
parent = 1
start = { x = 0.0, y = 0.0 }
end = { x = 0.0, y = 0.0 }
[[subbasin]]
id = 4
parent = 1
start = { x = 0.0, y = 0.0 }
end = { x = 0.0, y = 0.0 }
"#,
        )
        .unwrap();
        let network = NetworkBuilder::default().build(&description).unwrap();

        let rendered = network.to_tree_string().to_string();

        assert!(rendered.starts_with("1\n"));
        assert!(rendered.contains("5 (ghost)"));
        assert!(rendered.contains("4"));
    }

    #[test]
    fn given_empty_network_when_rendering_then_placeholder() {
        assert_eq!(Network::new().to_tree_string().root, "Empty network");
    }
}
