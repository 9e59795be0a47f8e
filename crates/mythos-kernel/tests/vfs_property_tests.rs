//! Property tests for path resolution and snapshots.

use mythos_kernel::vfs::Tree;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// Build every directory along `segments` and return their paths.
fn build(tree: &mut Tree, segments: &[String]) -> Vec<String> {
    let root = tree.root();
    let mut paths = Vec::new();
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(segment);
        if tree.resolve(root, &path).is_none() {
            tree.make_directory(root, &path, "root").unwrap();
        }
        paths.push(path.clone());
    }
    paths
}

proptest! {
    #[test]
    fn dotdot_resolves_to_parent(segments in prop::collection::vec(segment(), 1..6)) {
        let mut tree = Tree::new();
        let root = tree.root();
        let paths = build(&mut tree, &segments);

        for (i, path) in paths.iter().enumerate() {
            let node = tree.resolve(root, path).unwrap();
            let up = tree.resolve(root, &format!("{}/..", path)).unwrap();
            let expected = if i == 0 { root } else { tree.resolve(root, &paths[i - 1]).unwrap() };
            prop_assert_eq!(up, expected);
            prop_assert_eq!(tree.get(node).unwrap().parent, Some(expected));
            prop_assert_eq!(tree.path_of(node).unwrap(), path.clone());
        }
    }

    #[test]
    fn dotdot_never_escapes_root(depth in 0usize..8) {
        let tree = Tree::new();
        let root = tree.root();
        let path = vec![".."; depth + 1].join("/");
        prop_assert_eq!(tree.resolve(root, &path), Some(root));
        prop_assert_eq!(tree.resolve(root, &format!("/{}", path)), Some(root));
    }

    #[test]
    fn relative_and_absolute_agree(segments in prop::collection::vec(segment(), 2..6)) {
        let mut tree = Tree::new();
        let root = tree.root();
        let paths = build(&mut tree, &segments);

        let base = tree.resolve(root, &paths[0]).unwrap();
        let relative = segments[1..].join("/");
        let absolute = paths.last().unwrap();
        prop_assert_eq!(tree.resolve(base, &relative), tree.resolve(root, absolute));
        prop_assert_eq!(tree.resolve(base, &format!("./{}/.", relative)), tree.resolve(root, absolute));
    }

    #[test]
    fn snapshot_restore_preserves_files(
        files in prop::collection::btree_map(segment(), ".{0,40}", 0..8),
    ) {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.make_directory(root, "/data", "root").unwrap();
        for (name, content) in &files {
            tree.write_file(root, &format!("/data/{}", name), content, "guest").unwrap();
        }

        let restored = Tree::restore(&tree.snapshot()).unwrap();
        let rroot = restored.root();
        prop_assert_eq!(restored.node_count(), tree.node_count());
        for (name, content) in &files {
            let path = format!("/data/{}", name);
            prop_assert_eq!(restored.read_file(rroot, &path).unwrap(), content.clone());
            prop_assert_eq!(restored.stat(rroot, &path).unwrap().owner, "guest");
        }
    }
}
