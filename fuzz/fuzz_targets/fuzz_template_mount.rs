#![no_main]

use arbitrary::Arbitrary;
use knit_runtime::{ViewModel, VmConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Piece {
    Text(String),
    Marker(u8),
    Open(u8),
    Close,
    Comment(String),
    Model(u8),
    Click(u8),
}

const KEYS: [&str; 3] = ["a", "b", "c"];
const TAGS: [&str; 4] = ["div", "p", "span", "li"];

impl Piece {
    fn render(&self, out: &mut String, open: &mut Vec<&'static str>) {
        match self {
            Piece::Text(s) => out.push_str(&s.replace(['<', '>', '&'], "")),
            Piece::Marker(k) => out.push_str(&format!("{{{{ {} }}}}", KEYS[*k as usize % 3])),
            Piece::Open(t) => {
                let tag = TAGS[*t as usize % TAGS.len()];
                out.push_str(&format!("<{tag}>"));
                open.push(tag);
            }
            Piece::Close => {
                if let Some(tag) = open.pop() {
                    out.push_str(&format!("</{tag}>"));
                }
            }
            Piece::Comment(s) => out.push_str(&format!("<!--{}-->", s.replace('-', ""))),
            Piece::Model(k) => out.push_str(&format!("<input v-model=\"{}\">", KEYS[*k as usize % 3])),
            Piece::Click(k) => out.push_str(&format!("<button @click=\"m{}\">x</button>", k % 2)),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum Action {
    Write(u8, String),
    Click(u8),
    Type(u8, String),
}

#[derive(Arbitrary, Debug)]
struct Input {
    pieces: Vec<Piece>,
    actions: Vec<Action>,
}

fuzz_target!(|input: Input| {
    let mut body = String::new();
    let mut open = Vec::new();
    for piece in input.pieces.iter().take(64) {
        piece.render(&mut body, &mut open);
    }
    while let Some(tag) = open.pop() {
        body.push_str(&format!("</{tag}>"));
    }

    let config = VmConfig::new("#app")
        .data("a", "")
        .data("b", 0)
        .data("c", true)
        .method("m0", |vm, _| {
            let _ = vm.set("a", "clicked");
        });
    let Ok(vm) = ViewModel::from_markup(&format!("<div id=\"app\">{body}</div>"), config) else {
        return;
    };
    let doc = vm.document().clone();
    let buttons = doc.query_selector_all("#app button").expect("valid selector");
    let inputs = doc.query_selector_all("#app input").expect("valid selector");
    let mut writes = 0u64;
    for action in input.actions.iter().take(16) {
        match action {
            Action::Write(key, value) => {
                let key = KEYS[*key as usize % 3];
                vm.set(key, value.as_str()).expect("declared key");
                assert_eq!(vm.get(key), Some(value.as_str().into()));
                writes += 1;
            }
            Action::Click(i) if !buttons.is_empty() => {
                doc.click(buttons[*i as usize % buttons.len()]);
            }
            Action::Type(i, value) if !inputs.is_empty() => {
                doc.input(inputs[*i as usize % inputs.len()], value);
            }
            _ => {}
        }
    }
    // Clicks and typing add scans of their own.
    assert!(vm.scan_count() >= writes);
});
