use avlmap::{AvlTreeMap, Descending};

fn main() {
    let mut map = AvlTreeMap::new();
    map.insert(0, "zero");
    map.insert(1, "one");
    map.insert(2, "two");
    map.insert(2, "two");
    map.insert(3, "three");
    map.insert(4, "four");
    map.insert(5, "five");
    assert_eq!(map.get(&1), Some(&"one"));
    map.remove(&1);
    assert!(map.get(&1).is_none());
    assert!(map.try_get(&1).is_err());

    for (k, v) in &map {
        println!("{k} => {v}");
    }

    let (first, last) = map.equal_range(&3);
    assert_eq!(first.key(), Some(&3));
    assert_eq!(last.key(), Some(&4));

    for (k, v) in map.range(2..4) {
        println!("in range: {k} => {v}");
    }

    let mut counts: AvlTreeMap<&str, usize, _> = AvlTreeMap::with_comparator(Descending);
    for word in "the quick fox jumps over the lazy dog the end".split_whitespace() {
        *counts.get_or_insert_default(word) += 1;
    }

    print!("{{ ");
    for (word, count) in &counts {
        print!("{word}: {count}, ");
    }
    println!("}}");
}
