#![no_main]

use knit_dom::Document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(doc) = Document::parse(markup) {
        let root = doc.root();
        let _ = doc.inner_html(root);
        let _ = doc.text_content(root);
        let _ = doc.query_selector_all("div p");
    }
});
