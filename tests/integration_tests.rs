//! Integration tests for the deepdump crate.
//!
//! ## Structure Tests
//! - `test_pointer_chain_collapses`: Chains of pointers render as one
//!   annotation with every address
//! - `test_disabled_addresses_are_stable`: Separate allocations render
//!   identically without addresses
//! - `test_self_cycle_terminates`: A node pointing to itself
//! - `test_mutual_cycle_terminates`: Two nodes pointing to each other
//! - `test_cycle_through_trait_object`: A cycle closed by an `Rc<dyn Reflect>`
//! - `test_shared_target_renders_twice`: Acyclic sharing is not a cycle
//! - `test_max_depth`: Composites past the limit are replaced by a marker
//! - `test_byte_sequence_hex_dump`: Byte sequences render as hex dump rows,
//!   whatever the buffer layout
//! - `test_nil_versus_empty`: Missing and empty sequences and maps differ
//! - `test_capacities`: Capacity annotations for growable sequences
//! - `test_sort_keys`: Map entries in key order
//! - `test_interfaces_and_opaque_kinds`: Trait objects, functions, channels
//! - `test_display_adapter_and_writer`: The non-allocating entry points
//!
//! ## Custom Representation Tests
//! - `test_pointer_receiver_representation`: Where a pointer receiver
//!   representation applies and where it does not
//! - `test_disable_methods`: Structural rendering only
//! - `test_continue_on_method`: Representation followed by the structure
//! - `test_panicking_representation`: A panic is rendered inline
//! - `test_private_field_representation`: Unexported fields depend on
//!   widening
//! - `test_error_types`: Error types declared with `thiserror` and
//!   `derive_more`

use core::{cell::OnceCell, fmt};
use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    rc::Rc,
    sync::mpsc,
};

use deepdump::{Config, Reflect};

deepdump::reflect! {
    pub struct Node {
        pub name: &'static str,
        pub next: OnceCell<Rc<Node>>,
    }
}

impl Node {
    fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            name,
            next: OnceCell::new(),
        })
    }
}

deepdump::reflect! {
    struct Tag(pub String);
    repr = pointer_display;
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag:{}", self.0)
    }
}

deepdump::reflect! {
    struct Celsius(pub f64);
    repr = display;
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C", self.0)
    }
}

fn address_of<T: ?Sized>(value: &T) -> usize {
    core::ptr::from_ref(value).cast::<()>().addr()
}

#[test]
fn test_pointer_chain_collapses() {
    let value = 127i8;
    let pointer = &value;
    let pointer_to_pointer = &pointer;

    assert_eq!(
        deepdump::render(&pointer_to_pointer),
        format!(
            "(**i8)({:#x}->{:#x})(127)",
            address_of(&pointer),
            address_of(&value)
        )
    );

    let config = Config::DEFAULT.with_disable_pointer_addresses(true);
    assert_eq!(config.render(&pointer_to_pointer), "(**i8)(127)");
}

#[test]
fn test_disabled_addresses_are_stable() {
    let config = Config::DEFAULT.with_disable_pointer_addresses(true);
    let left = vec![Box::new(String::from("a"))];
    let right = vec![Box::new(String::from("a"))];

    assert_eq!(config.render(&left), config.render(&right));
    assert_eq!(
        config.render(&left),
        "(Vec<Box<String>>) (len=1) {\n (*String)((len=1) \"a\")\n}"
    );
    assert_ne!(deepdump::render(&left), deepdump::render(&right));
}

#[test]
fn test_self_cycle_terminates() {
    let root = Node::new("root");
    assert!(root.next.set(Rc::clone(&root)).is_ok());

    let address = Rc::as_ptr(&root).addr();
    assert_eq!(
        deepdump::render(&root),
        format!(
            "(*Node)({address:#x})({{\n name: (&str) (len=4) \"root\",\n next: (*Node)({address:#x})(<already shown>)\n}})"
        )
    );
}

#[test]
fn test_mutual_cycle_terminates() {
    let a = Node::new("a");
    let b = Node::new("b");
    assert!(a.next.set(Rc::clone(&b)).is_ok());
    assert!(b.next.set(Rc::clone(&a)).is_ok());

    let config = Config::DEFAULT.with_disable_pointer_addresses(true);
    assert_eq!(
        config.render(&a),
        concat!(
            "(*Node)({\n",
            " name: (&str) (len=1) \"a\",\n",
            " next: (*Node)({\n",
            "  name: (&str) (len=1) \"b\",\n",
            "  next: (*Node)(<already shown>)\n",
            " })\n",
            "})"
        )
    );
}

deepdump::reflect! {
    pub struct DynNode {
        pub label: u8,
        pub next: OnceCell<Rc<dyn Reflect>>,
    }
}

#[test]
fn test_cycle_through_trait_object() {
    let node = Rc::new(DynNode {
        label: 1,
        next: OnceCell::new(),
    });
    let erased: Rc<dyn Reflect> = node.clone();
    assert!(node.next.set(Rc::clone(&erased)).is_ok());

    assert_eq!(
        deepdump::render(&node),
        format!(
            "(*DynNode)({:#x})({{\n label: (u8) 1,\n next: (DynNode) <already shown>\n}})",
            Rc::as_ptr(&node).addr()
        )
    );
    assert_eq!(
        deepdump::render(&erased),
        "(DynNode) {\n label: (u8) 1,\n next: (DynNode) <already shown>\n}"
    );

    // Two nodes closing the cycle through each other's trait objects
    let other = Rc::new(DynNode {
        label: 2,
        next: OnceCell::new(),
    });
    let first = Rc::new(DynNode {
        label: 3,
        next: OnceCell::new(),
    });
    assert!(first.next.set(other.clone()).is_ok());
    assert!(other.next.set(first.clone()).is_ok());
    let first: Rc<dyn Reflect> = first;
    assert_eq!(
        deepdump::render(&first),
        concat!(
            "(DynNode) {\n",
            " label: (u8) 3,\n",
            " next: (DynNode) {\n",
            "  label: (u8) 2,\n",
            "  next: (DynNode) <already shown>\n",
            " }\n",
            "}"
        )
    );
}

#[test]
fn test_shared_target_renders_twice() {
    let shared = Rc::new(5u8);
    let siblings = (Rc::clone(&shared), Rc::clone(&shared));

    let config = Config::DEFAULT.with_disable_pointer_addresses(true);
    assert_eq!(
        config.render(&siblings),
        "((Rc<u8>, Rc<u8>)) {\n 0: (*u8)(5),\n 1: (*u8)(5)\n}"
    );
}

#[test]
fn test_max_depth() {
    let nested = vec![vec![1u16], vec![]];

    let config = Config::DEFAULT.with_max_depth(1);
    assert_eq!(
        config.render(&nested),
        concat!(
            "(Vec<Vec<u16>>) (len=2) {\n",
            " (Vec<u16>) (len=1) {\n",
            "  <max depth reached>\n",
            " },\n",
            " (Vec<u16>) (len=0) {\n",
            "  <max depth reached>\n",
            " }\n",
            "}"
        )
    );

    // Pointers do not count as a level
    let boxed = Box::new(vec![2u16]);
    let config = config.with_disable_pointer_addresses(true);
    assert_eq!(config.render(&boxed), "(*Vec<u16>)((len=1) {\n (u16) 2\n})");

    // A struct is shown, its composite fields are not
    let inventory = Inventory {
        owner: "ada",
        items: vec![1, 2],
        counts: BTreeMap::from([(1, 1)]),
        location: (4, 2),
    };
    assert_eq!(
        config.render(&inventory),
        concat!(
            "(Inventory) {\n",
            " owner: (&str) (len=3) \"ada\",\n",
            " items: (Vec<u16>) (len=2) {\n",
            "  <max depth reached>\n",
            " },\n",
            " counts: (BTreeMap<u8, u8>) (len=1) {\n",
            "  <max depth reached>\n",
            " },\n",
            " location: ((i32, i32)) {\n",
            "  <max depth reached>\n",
            " }\n",
            "}"
        )
    );
}

deepdump::reflect! {
    pub struct Inventory {
        pub owner: &'static str,
        pub items: Vec<u16>,
        pub counts: BTreeMap<u8, u8>,
        pub location: (i32, i32),
    }
}

#[test]
fn test_byte_sequence_hex_dump() {
    let bytes: Vec<u8> = (0..34).collect();
    let rendered = deepdump::render(&bytes);

    let expected = String::from("(Vec<u8>) (len=34) {\n")
        + " 00000000  00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f  |................|\n"
        + " 00000010  10 11 12 13 14 15 16 17  18 19 1a 1b 1c 1d 1e 1f  |................|\n"
        + " 00000020  20 21"
        + &" ".repeat(45)
        + "| !|\n"
        + "}";
    assert_eq!(rendered, expected);

    let empty: Vec<u8> = Vec::new();
    assert_eq!(deepdump::render(&empty), "(Vec<u8>) (len=0) {\n}");

    // A deque whose ring buffer wraps renders like a contiguous one
    let contiguous = VecDeque::from(vec![1u8, 2, 3]);
    let mut wrapped = VecDeque::new();
    wrapped.push_back(2u8);
    wrapped.push_back(3);
    wrapped.push_front(1);
    assert!(!wrapped.as_slices().1.is_empty());
    assert_eq!(wrapped, contiguous);

    let expected = String::from("(VecDeque<u8>) (len=3) {\n 00000000  01 02 03")
        + &" ".repeat(42)
        + "|...|\n}";
    assert_eq!(deepdump::render(&contiguous), expected);
    assert_eq!(deepdump::render(&wrapped), expected);
}

#[test]
fn test_nil_versus_empty() {
    assert_eq!(deepdump::render(&None::<Vec<i32>>), "(Vec<i32>) <nil>");
    assert_eq!(deepdump::render(&Vec::<i32>::new()), "(Vec<i32>) (len=0) {\n}");

    assert_eq!(
        deepdump::render(&None::<BTreeMap<u8, u8>>),
        "(BTreeMap<u8, u8>) <nil>"
    );
    assert_eq!(
        deepdump::render(&BTreeMap::<u8, u8>::new()),
        "(BTreeMap<u8, u8>) (len=0) {\n}"
    );

    assert_eq!(deepdump::render(&None::<Box<u8>>), "(*u8)(<nil>)");
}

#[test]
fn test_capacities() {
    let mut values: Vec<u16> = Vec::with_capacity(4);
    values.extend([1, 2]);
    let config = Config::DEFAULT.with_enable_capacities(true);
    assert_eq!(
        config.render(&values),
        format!(
            "(Vec<u16>) (len=2 cap={}) {{\n (u16) 1,\n (u16) 2\n}}",
            values.capacity()
        )
    );

    let empty: Vec<u16> = Vec::with_capacity(3);
    assert_eq!(
        config.render(&empty),
        format!("(Vec<u16>) (cap={}) {{\n}}", empty.capacity())
    );

    // Arrays have no capacity
    assert_eq!(config.render(&[7u16]), "([u16; 1]) (len=1) {\n (u16) 7\n}");
}

#[test]
fn test_sort_keys() {
    let map: HashMap<&str, u8> = [("delta", 4), ("alpha", 1), ("charlie", 3), ("bravo", 2)]
        .into_iter()
        .collect();

    let rendered = Config::DEFAULT.with_sort_keys(true).render(&map);
    let members: Vec<&str> = rendered.lines().skip(1).collect();
    assert_eq!(
        members,
        [
            " (&str) (len=5) \"alpha\": (u8) 1,",
            " (&str) (len=5) \"bravo\": (u8) 2,",
            " (&str) (len=7) \"charlie\": (u8) 3,",
            " (&str) (len=5) \"delta\": (u8) 4",
            "}",
        ]
    );
    assert!(rendered.lines().next().unwrap().ends_with("(len=4) {"));
}

fn double(value: u8) -> u8 {
    value * 2
}

#[test]
fn test_interfaces_and_opaque_kinds() {
    let mixed: Vec<Box<dyn Reflect>> = vec![Box::new(1u8), Box::new("hi")];
    assert_eq!(
        deepdump::render(&mixed),
        "(Vec<Box<dyn Reflect>>) (len=2) {\n (u8) 1,\n (&str) (len=2) \"hi\"\n}"
    );

    let function: fn(u8) -> u8 = double;
    assert_eq!(
        deepdump::render(&function),
        format!("(fn(u8) -> u8) {:#x}", function as usize)
    );
    assert_eq!(deepdump::render(&None::<fn()>), "(fn()) <nil>");

    let (sender, _receiver) = mpsc::channel::<u8>();
    assert_eq!(
        deepdump::render(&sender),
        format!("(Sender<u8>) {:#x}", address_of(&sender))
    );

    // Endpoints are identified by their own address, not the channel's
    let clone = sender.clone();
    assert_eq!(
        deepdump::render(&clone),
        format!("(Sender<u8>) {:#x}", address_of(&clone))
    );
    assert_ne!(deepdump::render(&clone), deepdump::render(&sender));
}

#[test]
fn test_display_adapter_and_writer() {
    let value = (true, 'q');
    let expected = "((bool, char)) {\n 0: (bool) true,\n 1: (char) 'q'\n}";

    assert_eq!(format!("{}", deepdump::display(&value)), expected);
    assert_eq!(format!("{:?}", Config::DEFAULT.display(&value)), expected);

    let mut out = String::from("got: ");
    Config::DEFAULT.write_to(&mut out, &value).unwrap();
    assert_eq!(out, format!("got: {expected}"));

    let config = Config::DEFAULT.with_indent("\t");
    assert_eq!(
        deepdump::render_with(&value, &config),
        "((bool, char)) {\n\t0: (bool) true,\n\t1: (char) 'q'\n}"
    );
}

#[cfg(feature = "std")]
#[test]
fn test_pointer_receiver_representation() {
    let tag = Tag(String::from("x"));

    // Behind a pointer the representation is always reachable
    let boxed = Box::new(Tag(String::from("x")));
    assert_eq!(
        deepdump::render(&boxed),
        format!("(*Tag)({:#x})((len=1) tag:x)", address_of(&*boxed))
    );

    // So it is for sequence elements, which are addressable
    let tags = vec![Tag(String::from("y"))];
    assert_eq!(
        deepdump::render(&tags),
        "(Vec<Tag>) (len=1) {\n (Tag) (len=1) tag:y\n}"
    );

    // A value passed in directly, or held in a map, needs widening
    let map = BTreeMap::from([(1u8, Tag(String::from("z")))]);
    if deepdump::widening_available() {
        assert_eq!(deepdump::render(&tag), "(Tag) (len=1) tag:x");
        assert_eq!(
            deepdump::render(&map),
            "(BTreeMap<u8, Tag>) (len=1) {\n (u8) 1: (Tag) (len=1) tag:z\n}"
        );
    } else {
        assert_eq!(deepdump::render(&tag), "(Tag) (len=1) \"x\"");
        assert_eq!(
            deepdump::render(&map),
            "(BTreeMap<u8, Tag>) (len=1) {\n (u8) 1: (Tag) (len=1) \"z\"\n}"
        );
    }

    let config = Config::DEFAULT.with_disable_pointer_methods(true);
    assert_eq!(config.render(&tag), "(Tag) (len=1) \"x\"");
    assert_eq!(
        config.render(&tags),
        "(Vec<Tag>) (len=1) {\n (Tag) (len=1) \"y\"\n}"
    );
}

#[cfg(feature = "std")]
#[test]
fn test_disable_methods() {
    let config = Config::DEFAULT.with_disable_methods(true);
    assert_eq!(config.render(&Celsius(21.5)), "(Celsius) 21.5");
    assert_eq!(config.render(&vec![Tag(String::from("x"))]), "(Vec<Tag>) (len=1) {\n (Tag) (len=1) \"x\"\n}");
    assert_eq!(Config::DIFF.render(&Celsius(21.5)), "(Celsius) 21.5");
}

#[cfg(feature = "std")]
#[test]
fn test_continue_on_method() {
    let config = Config::DEFAULT.with_continue_on_method(true);
    assert_eq!(config.render(&Celsius(21.5)), "(Celsius) (21.5°C) 21.5");
    assert_eq!(
        config.render(&vec![Tag(String::from("x"))]),
        "(Vec<Tag>) (len=1) {\n (Tag) (len=1) (tag:x) \"x\"\n}"
    );
}

deepdump::reflect! {
    struct Bomb(pub String);
    repr = display;
}

impl fmt::Display for Bomb {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        panic!("boom")
    }
}

deepdump::reflect! {
    struct Refusal(pub u8);
    repr = display;
}

impl fmt::Display for Refusal {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

deepdump::reflect! {
    struct Fuse(pub String);
    repr = pointer_display;
}

impl fmt::Display for Fuse {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        panic!("fuse blown")
    }
}

#[cfg(feature = "std")]
#[test]
fn test_panicking_representation() {
    let bomb = Bomb(String::from("x"));
    assert_eq!(deepdump::render(&bomb), "(Bomb) (len=1) (PANIC=boom)\"x\"");

    // The walk carries on after a panic
    let bombs = vec![Bomb(String::from("a")), Bomb(String::from("b"))];
    assert_eq!(
        deepdump::render(&bombs),
        "(Vec<Bomb>) (len=2) {\n (Bomb) (len=1) (PANIC=boom)\"a\",\n (Bomb) (len=1) (PANIC=boom)\"b\"\n}"
    );

    assert_eq!(deepdump::render(&Refusal(3)), "(Refusal) (PANIC=fmt::Error)3");

    // Pointer receivers panic the same way wherever they are invoked
    let boxed = Box::new(Fuse(String::from("x")));
    let config = Config::DEFAULT.with_disable_pointer_addresses(true);
    assert_eq!(
        config.render(&boxed),
        "(*Fuse)((len=1) (PANIC=fuse blown)\"x\")"
    );

    let fuse = Fuse(String::from("y"));
    if deepdump::widening_available() {
        assert_eq!(deepdump::render(&fuse), "(Fuse) (len=1) (PANIC=fuse blown)\"y\"");
    } else {
        assert_eq!(deepdump::render(&fuse), "(Fuse) (len=1) \"y\"");
    }
    assert_eq!(
        config.with_disable_pointer_methods(true).render(&boxed),
        "(*Fuse)((len=1) \"x\")"
    );
}

deepdump::reflect! {
    pub struct Reading {
        pub station: &'static str,
        temperature: Celsius,
    }
}

#[cfg(feature = "std")]
#[test]
fn test_private_field_representation() {
    let reading = Reading {
        station: "north",
        temperature: Celsius(-3.5),
    };

    let expected_temperature = if deepdump::widening_available() {
        "-3.5°C"
    } else {
        "-3.5"
    };
    assert_eq!(
        deepdump::render(&reading),
        format!(
            "(Reading) {{\n station: (&str) (len=5) \"north\",\n temperature: (Celsius) {expected_temperature}\n}}"
        )
    );
}

deepdump::reflect! {
    #[derive(Debug, thiserror::Error)]
    #[error("disk {0} is full")]
    pub struct DiskFull(pub u32);
    repr = error;
}

deepdump::reflect! {
    #[derive(Debug, derive_more::Display, derive_more::Error)]
    #[display("quota exceeded for {user}")]
    pub struct QuotaExceeded {
        pub user: String,
        limit: u64,
    }
    repr = error;
}

#[cfg(feature = "std")]
#[test]
fn test_error_types() {
    assert_eq!(deepdump::render(&DiskFull(7)), "(DiskFull) disk 7 is full");

    let quota = QuotaExceeded {
        user: String::from("ada"),
        limit: 10,
    };
    assert_eq!(deepdump::render(&quota), "(QuotaExceeded) quota exceeded for ada");
    assert_eq!(
        Config::DEFAULT.with_disable_methods(true).render(&quota),
        "(QuotaExceeded) {\n user: (String) (len=3) \"ada\",\n limit: (u64) 10\n}"
    );

    let boxed: Box<dyn Reflect> = Box::new(DiskFull(1));
    assert_eq!(deepdump::render(&boxed), "(DiskFull) disk 1 is full");
}
