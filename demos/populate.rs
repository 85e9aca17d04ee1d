use avltree::AvlTree;

fn main() {
    env_logger::init();

    let mut tree = AvlTree::new();
    let count = tree.populate(10);
    println!("Tree of {} items (with search keys 0-{}) generated", count, count - 1);

    tree.insert("apple", "fruit");
    tree.insert("carrot", "vegetable");
    if let Some(data) = tree.search("apple") {
        println!("apple was found, with data value: {}", data);
    }
    if tree.remove("7") {
        println!("7 was successfully removed");
    }

    println!("The tree contents are:");
    for (key, data) in &tree {
        println!("{}:{}", key, data);
    }

    println!("The tree debug data is:");
    for summary in tree.debug_structure() {
        println!("{}", summary);
    }

    match tree.validate() {
        Ok(()) => println!("Tree structure is valid."),
        Err(violation) => println!("{}", violation),
    }
}
